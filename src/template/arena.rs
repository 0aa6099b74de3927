//! Template arena: owns every template, links nested grids by id.
//!
//! A nested-grid unit stores its child's [`TemplateId`] and the child stores
//! its `(parent, unit)` pair. Neither owns the other, so there are no reference
//! cycles and teardown order is explicit: children are removed before parents.

use std::ops::{Index, IndexMut};

use slotmap::{new_key_type, SlotMap};

use crate::error::{GridError, Result};
use crate::track::GridRange;

use super::grid::Template;
use super::unit::{RepeatScope, UnitId};

new_key_type! {
    /// Identifier of a template in a [`TemplateArena`].
    pub struct TemplateId;
}

/// Slotmap-backed storage for templates.
#[derive(Debug, Default)]
pub struct TemplateArena {
    templates: SlotMap<TemplateId, Template>,
}

impl TemplateArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            templates: SlotMap::with_key(),
        }
    }

    /// Create an empty, unsealed template.
    pub fn create(&mut self) -> TemplateId {
        self.templates.insert_with_key(Template::new)
    }

    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn get_mut(&mut self, id: TemplateId) -> Option<&mut Template> {
        self.templates.get_mut(id)
    }

    /// Like [`get`](Self::get), failing with [`GridError::UnknownTemplate`].
    pub fn template(&self, id: TemplateId) -> Result<&Template> {
        self.get(id).ok_or(GridError::UnknownTemplate)
    }

    /// Like [`get_mut`](Self::get_mut), failing with [`GridError::UnknownTemplate`].
    pub fn template_mut(&mut self, id: TemplateId) -> Result<&mut Template> {
        self.get_mut(id).ok_or(GridError::UnknownTemplate)
    }

    /// Seal a template.
    pub fn seal(&mut self, id: TemplateId) -> Result<()> {
        self.template_mut(id)?.seal()
    }

    /// Embed the sealed template `child` in `parent` at `range`.
    ///
    /// The child must be sealed, scalar-only (no repeat range), and not yet
    /// embedded anywhere. With `repeat` set, the nested grid is instantiated once
    /// per row or block like any repeating unit.
    pub fn add_nested(
        &mut self,
        parent: TemplateId,
        range: GridRange,
        child: TemplateId,
        repeat: Option<RepeatScope>,
    ) -> Result<UnitId> {
        if parent == child {
            return Err(GridError::InvalidTemplate("a template cannot nest itself".into()));
        }
        {
            let nested = self.template(child)?;
            if !nested.is_sealed() {
                return Err(GridError::NotSealed);
            }
            if nested.parent().is_some() {
                return Err(GridError::InvalidTemplate("template is already nested".into()));
            }
            if !nested.repeat_range().is_empty() {
                return Err(GridError::InvalidTemplate(
                    "nested templates cannot have a repeat range".into(),
                ));
            }
        }
        let unit = self.template_mut(parent)?.insert_nested(range, child, repeat)?;
        self.templates[child].parent = Some((parent, unit));
        Ok(unit)
    }

    /// Child templates directly embedded in `id`, in declaration order.
    pub fn children(&self, id: TemplateId) -> Vec<TemplateId> {
        self.get(id)
            .map(|t| t.units().filter_map(|(_, u)| u.nested_child()).collect())
            .unwrap_or_default()
    }

    /// Remove a root template and all its nested descendants, children first.
    ///
    /// Nested templates cannot be removed on their own; remove their root.
    pub fn remove(&mut self, id: TemplateId) -> Result<()> {
        if self.template(id)?.parent().is_some() {
            return Err(GridError::InvalidTemplate(
                "cannot remove a nested template; remove its root".into(),
            ));
        }
        for descendant in self.post_order(id) {
            self.templates.remove(descendant);
        }
        Ok(())
    }

    /// Descendants of `id` in post-order (children before parents), ending with `id`.
    fn post_order(&self, id: TemplateId) -> Vec<TemplateId> {
        let mut result = Vec::new();
        for child in self.children(id) {
            result.extend(self.post_order(child));
        }
        result.push(id);
        result
    }

    /// Number of templates in the arena.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn contains(&self, id: TemplateId) -> bool {
        self.templates.contains_key(id)
    }
}

impl Index<TemplateId> for TemplateArena {
    type Output = Template;

    fn index(&self, id: TemplateId) -> &Template {
        &self.templates[id]
    }
}

impl IndexMut<TemplateId> for TemplateArena {
    fn index_mut(&mut self, id: TemplateId) -> &mut Template {
        &mut self.templates[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::testing::FixedElement;

    /// Helper: a sealed 1x1 template with one scalar.
    fn leaf(arena: &mut TemplateArena) -> TemplateId {
        let id = arena.create();
        let t = &mut arena[id];
        t.add_column("Auto").unwrap();
        t.add_row("Auto").unwrap();
        let range = t.range(0, 0).unwrap();
        t.add_scalar(range, || Box::new(FixedElement::new(5.0, 5.0)) as Box<dyn Element>)
            .unwrap();
        t.seal().unwrap();
        id
    }

    fn host(arena: &mut TemplateArena) -> TemplateId {
        let id = arena.create();
        arena[id].add_column("*").unwrap();
        arena[id].add_row("*").unwrap();
        id
    }

    #[test]
    fn create_and_lookup() {
        let mut arena = TemplateArena::new();
        assert!(arena.is_empty());
        let id = arena.create();
        assert_eq!(arena.len(), 1);
        assert!(arena.contains(id));
        assert_eq!(arena[id].id(), id);
    }

    #[test]
    fn add_nested_links_parent_and_child() {
        let mut arena = TemplateArena::new();
        let parent = host(&mut arena);
        let child = leaf(&mut arena);
        let range = arena[parent].range(0, 0).unwrap();
        let unit = arena.add_nested(parent, range, child, None).unwrap();

        assert_eq!(arena[child].parent(), Some((parent, unit)));
        assert_eq!(arena[parent].unit(unit).unwrap().nested_child(), Some(child));
        assert_eq!(arena.children(parent), vec![child]);
    }

    #[test]
    fn nested_child_must_be_sealed_and_unparented() {
        let mut arena = TemplateArena::new();
        let parent = host(&mut arena);
        let other = host(&mut arena);
        let range = arena[parent].range(0, 0).unwrap();

        let unsealed = host(&mut arena);
        assert_eq!(
            arena.add_nested(parent, range, unsealed, None).unwrap_err(),
            GridError::NotSealed
        );

        let child = leaf(&mut arena);
        arena.add_nested(parent, range, child, None).unwrap();
        let other_range = arena[other].range(0, 0).unwrap();
        assert!(matches!(
            arena.add_nested(other, other_range, child, None),
            Err(GridError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn cannot_nest_self() {
        let mut arena = TemplateArena::new();
        let parent = host(&mut arena);
        let range = arena[parent].range(0, 0).unwrap();
        assert!(matches!(
            arena.add_nested(parent, range, parent, None),
            Err(GridError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn remove_tears_down_children_first() {
        let mut arena = TemplateArena::new();
        let parent = host(&mut arena);
        let child = leaf(&mut arena);
        let range = arena[parent].range(0, 0).unwrap();
        arena.add_nested(parent, range, child, None).unwrap();

        assert_eq!(arena.post_order(parent), vec![child, parent]);
        assert!(matches!(arena.remove(child), Err(GridError::InvalidTemplate(_))));
        arena.remove(parent).unwrap();
        assert!(arena.is_empty());
        assert_eq!(arena.remove(parent).unwrap_err(), GridError::UnknownTemplate);
    }
}

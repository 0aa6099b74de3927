//! Unit instances: a leaf element or a nested grid.

use crate::geometry::{Rect, Size};
use crate::sizing::{GridSizing, Occupant};
use crate::template::unit::UnitContent;
use crate::template::{TemplateArena, TemplateId, Unit, UnitId};
use crate::track::GridRange;

use super::traits::{BindContext, Element};

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// The live visual of one unit.
pub enum Instance {
    /// A host element.
    Leaf(Box<dyn Element>),
    /// A child template laid out within the unit's rectangle.
    Nested(NestedGrid),
}

impl Instance {
    /// Instantiate `unit` of a template stored in `arena`.
    pub fn generate(arena: &TemplateArena, unit: &Unit) -> Self {
        match &unit.content {
            UnitContent::Grid(child) => Instance::Nested(NestedGrid::generate(arena, *child)),
            UnitContent::Element(generator) => Instance::Leaf(generator.generate()),
        }
    }

    pub fn initialize(&mut self, ctx: &BindContext) {
        match self {
            Instance::Leaf(element) => element.initialize(ctx),
            Instance::Nested(grid) => grid.for_each(|child| child.initialize(ctx)),
        }
    }

    pub fn refresh(&mut self, ctx: &BindContext) {
        match self {
            Instance::Leaf(element) => element.refresh(ctx),
            Instance::Nested(grid) => grid.for_each(|child| child.refresh(ctx)),
        }
    }

    pub fn cleanup(&mut self, ctx: &BindContext) {
        match self {
            Instance::Leaf(element) => element.cleanup(ctx),
            Instance::Nested(grid) => grid.for_each(|child| child.cleanup(ctx)),
        }
    }

    /// Desired size under `constraint`.
    pub fn measure(&mut self, arena: &TemplateArena, constraint: Size) -> Size {
        match self {
            Instance::Leaf(element) => element.measure(constraint),
            Instance::Nested(grid) => grid.measure(arena, constraint),
        }
    }

    /// Place the instance at `rect` (viewport coordinates).
    pub fn arrange(&mut self, arena: &TemplateArena, rect: Rect) {
        match self {
            Instance::Leaf(element) => element.arrange(rect),
            Instance::Nested(grid) => grid.arrange(arena, rect),
        }
    }

    pub fn as_nested(&self) -> Option<&NestedGrid> {
        match self {
            Instance::Nested(grid) => Some(grid),
            Instance::Leaf(_) => None,
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instance::Leaf(_) => f.write_str("Leaf"),
            Instance::Nested(grid) => f.debug_tuple("Nested").field(grid).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// NestedGrid
// ---------------------------------------------------------------------------

/// One unit instance of a nested grid.
#[derive(Debug)]
struct NestedChild {
    unit: UnitId,
    range: GridRange,
    instance: Instance,
}

/// A child template's units, sized with the static grid algorithm.
#[derive(Debug)]
pub struct NestedGrid {
    template: TemplateId,
    /// Units in the child's auto-size order.
    children: Vec<NestedChild>,
    sizing: GridSizing,
}

impl NestedGrid {
    fn generate(arena: &TemplateArena, template: TemplateId) -> Self {
        let mut children = Vec::new();
        if let Some(child) = arena.get(template) {
            if let Ok(registry) = child.registry() {
                for &unit in registry.auto_size_order() {
                    if let Some(declared) = child.unit(unit) {
                        children.push(NestedChild {
                            unit,
                            range: declared.range(),
                            instance: Instance::generate(arena, declared),
                        });
                    }
                }
            }
        }
        Self {
            template,
            children,
            sizing: GridSizing::new(),
        }
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// Child instances in auto-size order.
    pub fn children(&self) -> impl Iterator<Item = (UnitId, &Instance)> + '_ {
        self.children.iter().map(|child| (child.unit, &child.instance))
    }

    /// Resolved lengths from the most recent measure or arrange.
    pub fn sizing(&self) -> &GridSizing {
        &self.sizing
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut Instance)) {
        for child in &mut self.children {
            f(&mut child.instance);
        }
    }

    fn measure(&mut self, arena: &TemplateArena, constraint: Size) -> Size {
        self.resolve(arena, constraint)
    }

    fn arrange(&mut self, arena: &TemplateArena, rect: Rect) {
        self.resolve(arena, rect.size());
        for child in &mut self.children {
            let child_rect = self.sizing.rect(&child.range).translate(rect.origin());
            child.instance.arrange(arena, child_rect);
        }
    }

    fn resolve(&mut self, arena: &TemplateArena, available: Size) -> Size {
        let Some(template) = arena.get(self.template) else {
            return Size::ZERO;
        };
        let mut occupants: Vec<NestedOccupant<'_>> = self
            .children
            .iter_mut()
            .map(|child| NestedOccupant { child, arena })
            .collect();
        let mut refs: Vec<&mut dyn Occupant> = occupants
            .iter_mut()
            .map(|occupant| occupant as &mut dyn Occupant)
            .collect();
        self.sizing.resolve(template, available, &mut refs)
    }
}

/// Adapts a nested child to the sizing resolver.
struct NestedOccupant<'a> {
    child: &'a mut NestedChild,
    arena: &'a TemplateArena,
}

impl Occupant for NestedOccupant<'_> {
    fn range(&self) -> GridRange {
        self.child.range
    }

    fn measure(&mut self, constraint: Size) -> Size {
        self.child.instance.measure(self.arena, constraint)
    }
}

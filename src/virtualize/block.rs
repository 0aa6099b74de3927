//! Block instances: the recyclable visual of one realized block.
//!
//! A block holds one instance per block-scope unit and, for each of its data
//! rows, one instance per row-scope unit. The whole block goes to the recycle
//! pool when virtualized and is re-bound to another block when reused.

use slotmap::SecondaryMap;

use crate::element::{BindContext, Instance};
use crate::template::{Placement, RepeatScope, Template, TemplateArena, UnitId};

// ---------------------------------------------------------------------------
// RowInstance
// ---------------------------------------------------------------------------

/// Row-scope unit instances for one data row.
#[derive(Debug)]
pub struct RowInstance {
    row: usize,
    is_current: bool,
    units: SecondaryMap<UnitId, Instance>,
}

impl RowInstance {
    fn generate(arena: &TemplateArena, template: &Template, row_units: &[UnitId]) -> Self {
        let mut units = SecondaryMap::new();
        for &id in row_units {
            if let Some(unit) = template.unit(id) {
                units.insert(id, Instance::generate(arena, unit));
            }
        }
        Self {
            row: 0,
            is_current: false,
            units,
        }
    }

    /// Data row ordinal this instance is bound to.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn is_current(&self) -> bool {
        self.is_current
    }

    pub fn unit(&self, id: UnitId) -> Option<&Instance> {
        self.units.get(id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Instance> {
        self.units.get_mut(id)
    }

    fn context(&self, block: usize) -> BindContext {
        BindContext::row(block, self.row, self.is_current)
    }
}

// ---------------------------------------------------------------------------
// BlockInstance
// ---------------------------------------------------------------------------

/// All repeating-unit instances of one block.
#[derive(Debug)]
pub struct BlockInstance {
    block: usize,
    block_units: SecondaryMap<UnitId, Instance>,
    row_units: Vec<UnitId>,
    rows: Vec<RowInstance>,
}

impl BlockInstance {
    /// Create fresh instances for every repeating unit of `template`.
    pub(crate) fn generate(arena: &TemplateArena, template: &Template, repeating: &[UnitId]) -> Self {
        let mut block_units = SecondaryMap::new();
        let mut row_units = Vec::new();
        for &id in repeating {
            let Some(unit) = template.unit(id) else { continue };
            match unit.placement() {
                Placement::Repeating(RepeatScope::Block) => {
                    block_units.insert(id, Instance::generate(arena, unit));
                }
                _ => row_units.push(id),
            }
        }
        Self {
            block: 0,
            block_units,
            row_units,
            rows: Vec::new(),
        }
    }

    /// Bind to `block`, holding `rows` data rows starting at `first_row`.
    ///
    /// Row instances are created or dropped to match `rows`, then every
    /// instance is initialized with its new context.
    pub(crate) fn bind(
        &mut self,
        arena: &TemplateArena,
        template: &Template,
        block: usize,
        first_row: usize,
        rows: usize,
        current_row: Option<usize>,
    ) {
        self.block = block;
        self.rows.truncate(rows);
        while self.rows.len() < rows {
            self.rows.push(RowInstance::generate(arena, template, &self.row_units));
        }
        for (k, row) in self.rows.iter_mut().enumerate() {
            row.row = first_row + k;
            row.is_current = current_row == Some(row.row);
        }
        self.for_each(|instance, ctx| instance.initialize(ctx));
    }

    /// Release the binding before pooling.
    pub(crate) fn cleanup(&mut self) {
        self.for_each(|instance, ctx| instance.cleanup(ctx));
    }

    pub(crate) fn refresh(&mut self, current_row: Option<usize>) {
        for row in &mut self.rows {
            row.is_current = current_row == Some(row.row);
        }
        self.for_each(|instance, ctx| instance.refresh(ctx));
    }

    /// Block ordinal this instance is bound to.
    pub fn block(&self) -> usize {
        self.block
    }

    /// Row instances; row `k` sits in slot `k` across the flow axis.
    pub fn rows(&self) -> &[RowInstance] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [RowInstance] {
        &mut self.rows
    }

    pub fn block_unit(&self, id: UnitId) -> Option<&Instance> {
        self.block_units.get(id)
    }

    pub fn block_unit_mut(&mut self, id: UnitId) -> Option<&mut Instance> {
        self.block_units.get_mut(id)
    }

    /// Instances of unit `id` in this block with their row slot: one for a
    /// block-scope unit (slot `None`), one per row for a row-scope unit.
    pub fn instances_mut(&mut self, id: UnitId) -> Vec<(Option<usize>, &mut Instance)> {
        if let Some(instance) = self.block_units.get_mut(id) {
            return vec![(None, instance)];
        }
        self.rows
            .iter_mut()
            .enumerate()
            .filter_map(|(k, row)| row.units.get_mut(id).map(|instance| (Some(k), instance)))
            .collect()
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut Instance, &BindContext)) {
        let block_ctx = BindContext::block(self.block);
        for (_, instance) in self.block_units.iter_mut() {
            f(instance, &block_ctx);
        }
        for row in &mut self.rows {
            let ctx = row.context(self.block);
            for (_, instance) in row.units.iter_mut() {
                f(instance, &ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::element::Element;
    use crate::template::TemplateId;
    use crate::testing::{ElementLog, FixedElement, LifecycleEvent, TrackedElement};

    /// Two rows per block; one block-scope header cell and one row-scope cell.
    fn template(arena: &mut TemplateArena, log: &ElementLog) -> (TemplateId, UnitId, UnitId) {
        let id = arena.create();
        let t = &mut arena[id];
        t.add_column("40").unwrap();
        t.add_row("10").unwrap();
        t.add_row("Auto").unwrap();
        t.set_repeat_range(t.range_span(0, 0, 0, 1).unwrap()).unwrap();
        t.set_block_dimensions(2).unwrap();
        let tracked = |log: &ElementLog| {
            let log = log.clone();
            move || Box::new(TrackedElement::new(&log, FixedElement::new(5.0, 5.0))) as Box<dyn Element>
        };
        let head = t
            .add_repeating(t.range(0, 0).unwrap(), RepeatScope::Block, tracked(log))
            .unwrap();
        let cell = t
            .add_repeating(t.range(0, 1).unwrap(), RepeatScope::Row, tracked(log))
            .unwrap();
        t.seal().unwrap();
        (id, head, cell)
    }

    #[test]
    fn bind_creates_rows_and_initializes_everything() {
        let mut arena = TemplateArena::new();
        let log = ElementLog::new();
        let (id, head, cell) = template(&mut arena, &log);
        let t = &arena[id];
        let repeating = t.registry().unwrap().repeating().to_vec();

        let mut block = BlockInstance::generate(&arena, t, &repeating);
        block.bind(&arena, t, 3, 6, 2, Some(7));

        assert_eq!(block.block(), 3);
        assert_eq!(block.rows().iter().map(RowInstance::row).collect::<Vec<_>>(), vec![6, 7]);
        assert!(block.rows()[1].is_current());
        assert!(block.block_unit(head).is_some());
        assert_eq!(block.instances_mut(cell).len(), 2);
        assert_eq!(block.instances_mut(head)[0].0, None);
        assert_eq!(log.created(), 3);
        assert_eq!(
            log.count(|e| matches!(e, LifecycleEvent::Initialized { row: Some(7), is_current: true, .. })),
            1
        );
    }

    #[test]
    fn rebinding_a_short_block_drops_extra_rows() {
        let mut arena = TemplateArena::new();
        let log = ElementLog::new();
        let (id, _, cell) = template(&mut arena, &log);
        let t = &arena[id];
        let repeating = t.registry().unwrap().repeating().to_vec();

        let mut block = BlockInstance::generate(&arena, t, &repeating);
        block.bind(&arena, t, 0, 0, 2, None);
        block.cleanup();
        block.bind(&arena, t, 4, 8, 1, None);

        assert_eq!(block.instances_mut(cell).len(), 1);
        assert_eq!(block.rows()[0].row(), 8);
        assert_eq!(log.count(|e| matches!(e, LifecycleEvent::CleanedUp { .. })), 3);
        assert_eq!(log.created(), 3);
    }
}

//! Template: the sealed description of a grid, its tracks and its units.

use slotmap::SlotMap;

use crate::element::Generator;
use crate::error::{GridError, Result};
use crate::geometry::Axis;
use crate::track::{GridRange, Span, TrackList, TrackSpec};

use super::registry::UnitRegistry;
use super::unit::{Placement, RepeatScope, Unit, UnitContent, UnitId};
use super::TemplateId;

/// Number of tracks pinned at the leading and trailing edge of an axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pinned {
    pub head: usize,
    pub tail: usize,
}

/// Columns, rows, and units of one grid.
///
/// Built once through the `add_*`/`set_*` methods, then [`seal`](Self::seal)ed.
/// After sealing the structure is immutable; only per-pass track lengths (kept
/// by the layout state, not here) change.
#[derive(Debug)]
pub struct Template {
    id: TemplateId,
    tracks: [TrackList; 2],
    units: SlotMap<UnitId, Unit>,
    declared: Vec<UnitId>,
    repeat_range: GridRange,
    flow: Axis,
    block_dimensions: usize,
    pinned: [Pinned; 2],
    scalar_count: usize,
    repeating_count: usize,
    pub(crate) parent: Option<(TemplateId, UnitId)>,
    registry: Option<UnitRegistry>,
}

impl Template {
    pub(crate) fn new(id: TemplateId) -> Self {
        Self {
            id,
            tracks: [TrackList::new(Axis::Horizontal), TrackList::new(Axis::Vertical)],
            units: SlotMap::with_key(),
            declared: Vec::new(),
            repeat_range: GridRange::EMPTY,
            flow: Axis::Vertical,
            block_dimensions: 1,
            pinned: [Pinned::default(); 2],
            scalar_count: 0,
            repeating_count: 0,
            parent: None,
            registry: None,
        }
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    // ── Tracks ───────────────────────────────────────────────────────

    /// The tracks of `axis`.
    pub fn tracks(&self, axis: Axis) -> &TrackList {
        &self.tracks[axis.index()]
    }

    pub fn columns(&self) -> &TrackList {
        self.tracks(Axis::Horizontal)
    }

    pub fn rows(&self) -> &TrackList {
        self.tracks(Axis::Vertical)
    }

    /// Append a track to `axis`, returning its ordinal.
    pub fn add_track(&mut self, axis: Axis, spec: TrackSpec) -> Result<usize> {
        self.ensure_unsealed()?;
        self.tracks[axis.index()].add(spec)
    }

    /// Append a column from a length token string (`"20"`, `"*"`, `"2*"`, `"Auto"`).
    pub fn add_column(&mut self, length: &str) -> Result<usize> {
        self.add_track(Axis::Horizontal, TrackSpec::parse(length)?)
    }

    /// Append a row from a length token string.
    pub fn add_row(&mut self, length: &str) -> Result<usize> {
        self.add_track(Axis::Vertical, TrackSpec::parse(length)?)
    }

    // ── Ranges ───────────────────────────────────────────────────────

    /// The single cell at `(column, row)`.
    pub fn range(&self, column: usize, row: usize) -> Result<GridRange> {
        self.range_span(column, row, column, row)
    }

    /// The rectangle `(left, top) ..= (right, bottom)`.
    pub fn range_span(&self, left: usize, top: usize, right: usize, bottom: usize) -> Result<GridRange> {
        self.columns().check(left)?;
        self.columns().check(right)?;
        self.rows().check(top)?;
        self.rows().check(bottom)?;
        if right < left || bottom < top {
            return Err(GridError::InvalidRange { left, top, right, bottom });
        }
        Ok(GridRange::new(self.id, left, top, right, bottom))
    }

    // ── Layout settings ──────────────────────────────────────────────

    /// Set the range whose rows/columns repeat once per data block.
    pub fn set_repeat_range(&mut self, range: GridRange) -> Result<()> {
        self.ensure_unsealed()?;
        self.ensure_owned(&range)?;
        self.repeat_range = range;
        Ok(())
    }

    pub fn repeat_range(&self) -> GridRange {
        self.repeat_range
    }

    /// The repeat range's span on `axis`, if a repeat range is set.
    pub fn repeat_span(&self, axis: Axis) -> Option<Span> {
        (!self.repeat_range.is_empty()).then(|| self.repeat_range.span(axis))
    }

    /// Set the axis along which blocks repeat (and which is virtualized).
    pub fn set_flow(&mut self, axis: Axis) -> Result<()> {
        self.ensure_unsealed()?;
        self.flow = axis;
        Ok(())
    }

    pub fn flow(&self) -> Axis {
        self.flow
    }

    /// Set how many data rows share one block, laid out across the flow axis.
    pub fn set_block_dimensions(&mut self, rows_per_block: usize) -> Result<()> {
        self.ensure_unsealed()?;
        if rows_per_block == 0 {
            return Err(GridError::InvalidTemplate("block dimensions must be at least 1".into()));
        }
        self.block_dimensions = rows_per_block;
        Ok(())
    }

    pub fn block_dimensions(&self) -> usize {
        self.block_dimensions
    }

    /// Number of blocks needed to show `row_count` data rows.
    pub fn block_count(&self, row_count: usize) -> usize {
        if self.repeat_range.is_empty() {
            0
        } else {
            row_count.div_ceil(self.block_dimensions)
        }
    }

    /// Pin `head` leading and `tail` trailing tracks of `axis`.
    pub fn set_pinned(&mut self, axis: Axis, head: usize, tail: usize) -> Result<()> {
        self.ensure_unsealed()?;
        self.pinned[axis.index()] = Pinned { head, tail };
        Ok(())
    }

    pub fn pinned(&self, axis: Axis) -> Pinned {
        self.pinned[axis.index()]
    }

    // ── Units ────────────────────────────────────────────────────────

    /// Declare a unit rendered exactly once.
    pub fn add_scalar(&mut self, range: GridRange, generator: impl Generator + 'static) -> Result<UnitId> {
        self.insert_unit(Placement::Scalar, UnitContent::Element(Box::new(generator)), range)
    }

    /// Declare a unit rendered once per data row or once per block.
    pub fn add_repeating(
        &mut self,
        range: GridRange,
        scope: RepeatScope,
        generator: impl Generator + 'static,
    ) -> Result<UnitId> {
        self.insert_unit(
            Placement::Repeating(scope),
            UnitContent::Element(Box::new(generator)),
            range,
        )
    }

    /// Nested grids are added through [`TemplateArena::add_nested`](super::TemplateArena::add_nested),
    /// which also records the child's parent.
    pub(crate) fn insert_nested(
        &mut self,
        range: GridRange,
        child: TemplateId,
        repeat: Option<RepeatScope>,
    ) -> Result<UnitId> {
        let placement = repeat.map_or(Placement::Scalar, Placement::Repeating);
        self.insert_unit(placement, UnitContent::Grid(child), range)
    }

    fn insert_unit(&mut self, placement: Placement, content: UnitContent, range: GridRange) -> Result<UnitId> {
        self.ensure_unsealed()?;
        self.ensure_owned(&range)?;
        let counter = match placement {
            Placement::Scalar => &mut self.scalar_count,
            Placement::Repeating(_) => &mut self.repeating_count,
        };
        let ordinal = *counter;
        *counter += 1;
        let id = self.units.insert(Unit {
            placement,
            content,
            range,
            ordinal,
            auto_size_order: None,
        });
        self.declared.push(id);
        Ok(id)
    }

    /// Give `unit` an explicit content-measurement priority (lower first).
    pub fn set_auto_size_order(&mut self, unit: UnitId, order: u32) -> Result<()> {
        self.ensure_unsealed()?;
        let unit = self
            .units
            .get_mut(unit)
            .ok_or_else(|| GridError::InvalidTemplate("unknown unit".into()))?;
        unit.auto_size_order = Some(order);
        Ok(())
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Units in declaration order.
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.declared.iter().map(|&id| (id, &self.units[id]))
    }

    pub fn unit_count(&self) -> usize {
        self.declared.len()
    }

    /// The `(template, unit)` that embeds this template as a nested grid.
    pub fn parent(&self) -> Option<(TemplateId, UnitId)> {
        self.parent
    }

    // ── Sealing ──────────────────────────────────────────────────────

    pub fn is_sealed(&self) -> bool {
        self.registry.is_some()
    }

    /// The unit registry. Only available once sealed.
    pub fn registry(&self) -> Result<&UnitRegistry> {
        self.registry.as_ref().ok_or(GridError::NotSealed)
    }

    /// Validate the structure and freeze it.
    pub fn seal(&mut self) -> Result<()> {
        self.ensure_unsealed()?;
        self.validate()?;
        self.registry = Some(UnitRegistry::build(
            &self.units,
            &self.declared,
            self.flow,
            self.repeat_span(self.flow),
        ));
        tracing::debug!(
            columns = self.columns().len(),
            rows = self.rows().len(),
            units = self.declared.len(),
            "template sealed"
        );
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(GridError::InvalidTemplate(message));

        if self.columns().is_empty() || self.rows().is_empty() {
            return invalid("a template needs at least one column and one row".into());
        }
        for axis in Axis::ALL {
            let pinned = self.pinned(axis);
            if pinned.head + pinned.tail > self.tracks(axis).len() {
                return invalid(format!("{axis:?} pinned tracks exceed the track count"));
            }
        }

        let flow = self.flow;
        let cross = flow.other();
        let main_span = self.repeat_span(flow);

        if let Some(main) = main_span {
            if main.iter().any(|t| self.tracks(flow)[t].is_proportional()) {
                return invalid("proportional tracks cannot repeat along the flow axis".into());
            }
            let pinned = self.pinned(flow);
            let count = self.tracks(flow).len();
            if pinned.head > main.start || count - pinned.tail <= main.end {
                return invalid("pinned flow-axis tracks overlap the repeat range".into());
            }
            if self.block_dimensions > 1 {
                let cross_span = self.repeat_range.span(cross);
                if cross_span.iter().any(|t| self.tracks(cross)[t].is_proportional()) {
                    return invalid("proportional tracks cannot repeat across blocks".into());
                }
            }
        }

        for (_, unit) in self.units() {
            let span = unit.range.span(flow);
            match (unit.placement(), main_span) {
                (Placement::Scalar, Some(main)) if span.overlaps(main) => {
                    return invalid(format!("scalar unit {} overlaps the repeat range", unit.ordinal));
                }
                (Placement::Scalar, _) => {}
                (Placement::Repeating(_), None) => {
                    return invalid("repeating units require a repeat range".into());
                }
                (Placement::Repeating(RepeatScope::Row), Some(_)) => {
                    if !self.repeat_range.contains(&unit.range) {
                        return invalid(format!("row unit {} lies outside the repeat range", unit.ordinal));
                    }
                }
                (Placement::Repeating(RepeatScope::Block), Some(main)) => {
                    if !main.contains_span(span) {
                        return invalid(format!("block unit {} lies outside the repeat range", unit.ordinal));
                    }
                }
            }
        }
        Ok(())
    }

    fn ensure_unsealed(&self) -> Result<()> {
        if self.is_sealed() {
            Err(GridError::Sealed)
        } else {
            Ok(())
        }
    }

    fn ensure_owned(&self, range: &GridRange) -> Result<()> {
        if range.owner() == Some(self.id) {
            Ok(())
        } else {
            Err(GridError::MismatchedTemplate)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::element::Element;
    use crate::template::TemplateArena;
    use crate::testing::FixedElement;

    fn fixed() -> impl Generator + 'static {
        || Box::new(FixedElement::new(10.0, 10.0)) as Box<dyn Element>
    }

    /// Helper: a 2x3 template (columns `*`, `*`; rows `20`, `Auto`, `20`).
    fn table(arena: &mut TemplateArena) -> TemplateId {
        let id = arena.create();
        let t = &mut arena[id];
        t.add_column("*").unwrap();
        t.add_column("*").unwrap();
        t.add_row("20").unwrap();
        t.add_row("Auto").unwrap();
        t.add_row("20").unwrap();
        id
    }

    // -----------------------------------------------------------------------
    // Ranges
    // -----------------------------------------------------------------------

    #[test]
    fn range_validates_bounds() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &arena[id];
        assert!(t.range(1, 2).is_ok());
        assert_eq!(
            t.range(2, 0).unwrap_err(),
            GridError::TrackOutOfRange { axis: Axis::Horizontal, ordinal: 2, count: 2 }
        );
        assert_eq!(
            t.range_span(1, 2, 0, 2).unwrap_err(),
            GridError::InvalidRange { left: 1, top: 2, right: 0, bottom: 2 }
        );
    }

    #[test]
    fn units_from_foreign_ranges_are_rejected() {
        let mut arena = TemplateArena::new();
        let a = table(&mut arena);
        let b = table(&mut arena);
        let foreign = arena[b].range(0, 0).unwrap();
        assert_eq!(
            arena[a].add_scalar(foreign, fixed()).unwrap_err(),
            GridError::MismatchedTemplate
        );
    }

    // -----------------------------------------------------------------------
    // Sealing
    // -----------------------------------------------------------------------

    #[test]
    fn sealed_template_rejects_mutation() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        arena[id].seal().unwrap();
        assert_eq!(arena[id].add_row("20").unwrap_err(), GridError::Sealed);
        assert_eq!(arena[id].set_flow(Axis::Horizontal).unwrap_err(), GridError::Sealed);
        assert_eq!(arena[id].seal().unwrap_err(), GridError::Sealed);
    }

    #[test]
    fn registry_requires_seal() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        assert_eq!(arena[id].registry().unwrap_err(), GridError::NotSealed);
    }

    #[test]
    fn empty_template_is_invalid() {
        let mut arena = TemplateArena::new();
        let id = arena.create();
        assert!(matches!(arena[id].seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn scalar_overlapping_repeat_range_is_invalid() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let repeat = t.range_span(0, 1, 1, 1).unwrap();
        t.set_repeat_range(repeat).unwrap();
        let range = t.range_span(0, 0, 0, 1).unwrap();
        t.add_scalar(range, fixed()).unwrap();
        assert!(matches!(t.seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn row_unit_outside_repeat_range_is_invalid() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let repeat = t.range_span(0, 1, 0, 1).unwrap();
        t.set_repeat_range(repeat).unwrap();
        let range = t.range(1, 1).unwrap();
        t.add_repeating(range, RepeatScope::Row, fixed()).unwrap();
        assert!(matches!(t.seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn block_unit_may_leave_repeat_cross_span() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let repeat = t.range_span(1, 1, 1, 1).unwrap();
        t.set_repeat_range(repeat).unwrap();
        let header = t.range(0, 1).unwrap();
        t.add_repeating(header, RepeatScope::Block, fixed()).unwrap();
        assert!(t.seal().is_ok());
    }

    #[test]
    fn repeating_without_range_is_invalid() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let range = t.range(0, 1).unwrap();
        t.add_repeating(range, RepeatScope::Row, fixed()).unwrap();
        assert!(matches!(t.seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn star_track_inside_repeat_flow_span_is_invalid() {
        let mut arena = TemplateArena::new();
        let id = arena.create();
        let t = &mut arena[id];
        t.add_column("*").unwrap();
        t.add_row("*").unwrap();
        let repeat = t.range(0, 0).unwrap();
        t.set_repeat_range(repeat).unwrap();
        assert!(matches!(t.seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn pinned_flow_tracks_cannot_overlap_repeat_range() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let repeat = t.range_span(0, 1, 1, 1).unwrap();
        t.set_repeat_range(repeat).unwrap();
        t.set_pinned(Axis::Vertical, 2, 0).unwrap();
        assert!(matches!(t.seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn pinned_counts_must_fit() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        arena[id].set_pinned(Axis::Horizontal, 2, 1).unwrap();
        assert!(matches!(arena[id].seal(), Err(GridError::InvalidTemplate(_))));
    }

    #[test]
    fn zero_block_dimensions_rejected() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        assert!(arena[id].set_block_dimensions(0).is_err());
        assert_eq!(arena[id].block_dimensions(), 1);
    }

    #[test]
    fn block_count_rounds_up() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        assert_eq!(t.block_count(10), 0);
        let repeat = t.range_span(0, 1, 1, 1).unwrap();
        t.set_repeat_range(repeat).unwrap();
        t.set_block_dimensions(3).unwrap();
        assert_eq!(t.block_count(10), 4);
        assert_eq!(t.block_count(9), 3);
        assert_eq!(t.block_count(0), 0);
    }

    // -----------------------------------------------------------------------
    // Registry ordering
    // -----------------------------------------------------------------------

    #[test]
    fn registry_groups_scalars_around_repeat_range() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let repeat = t.range_span(0, 1, 1, 1).unwrap();
        t.set_repeat_range(repeat).unwrap();

        let footer = t.add_scalar(t.range(0, 2).unwrap(), fixed()).unwrap();
        let cell = t.add_repeating(t.range(0, 1).unwrap(), RepeatScope::Row, fixed()).unwrap();
        let header = t.add_scalar(t.range(1, 0).unwrap(), fixed()).unwrap();
        t.seal().unwrap();

        let registry = t.registry().unwrap();
        assert_eq!(registry.scalars_before(), &[header]);
        assert_eq!(registry.repeating(), &[cell]);
        assert_eq!(registry.scalars_after(), &[footer]);
        assert_eq!(registry.auto_size_order(), &[header, cell, footer]);
        assert_eq!(t.unit(footer).unwrap().ordinal(), 0);
        assert_eq!(t.unit(header).unwrap().ordinal(), 1);
        assert_eq!(t.unit(cell).unwrap().ordinal(), 0);
    }

    #[test]
    fn explicit_priority_measures_first() {
        let mut arena = TemplateArena::new();
        let id = table(&mut arena);
        let t = &mut arena[id];
        let a = t.add_scalar(t.range(0, 0).unwrap(), fixed()).unwrap();
        let b = t.add_scalar(t.range(1, 0).unwrap(), fixed()).unwrap();
        let c = t.add_scalar(t.range(0, 1).unwrap(), fixed()).unwrap();
        t.set_auto_size_order(c, 5).unwrap();
        t.set_auto_size_order(b, 1).unwrap();
        t.seal().unwrap();
        assert_eq!(t.registry().unwrap().auto_size_order(), &[b, c, a]);
    }
}

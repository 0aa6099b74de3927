//! Unit registry: classification and measurement ordering of a sealed template.
//!
//! Scalars are split into those placed before the repeat range and those placed
//! after it along the flow axis. The content-measurement order is: units with an
//! explicit `auto_size_order` (ascending), then everyone else in declaration
//! order grouped as scalars-before, repeating, scalars-after.

use slotmap::SlotMap;

use crate::geometry::Axis;
use crate::track::Span;

use super::unit::{Unit, UnitId};

/// Ordered views over the units of a sealed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitRegistry {
    scalars_before: Vec<UnitId>,
    repeating: Vec<UnitId>,
    scalars_after: Vec<UnitId>,
    auto_size_order: Vec<UnitId>,
}

impl UnitRegistry {
    /// Classify `declared` units against the repeat range's flow-axis span.
    pub(crate) fn build(
        units: &SlotMap<UnitId, Unit>,
        declared: &[UnitId],
        flow: Axis,
        repeat: Option<Span>,
    ) -> Self {
        let mut registry = Self::default();

        for &id in declared {
            let unit = &units[id];
            if unit.is_repeating() {
                registry.repeating.push(id);
                continue;
            }
            let after = repeat.is_some_and(|span| unit.range.span(flow).start > span.end);
            if after {
                registry.scalars_after.push(id);
            } else {
                registry.scalars_before.push(id);
            }
        }

        let mut order: Vec<UnitId> = registry
            .scalars_before
            .iter()
            .chain(&registry.repeating)
            .chain(&registry.scalars_after)
            .copied()
            .collect();
        // Stable: ties keep the grouped declaration order.
        order.sort_by_key(|&id| match units[id].auto_size_order {
            Some(priority) => (0, priority),
            None => (1, 0),
        });
        registry.auto_size_order = order;
        registry
    }

    /// Scalars placed before the repeat range (all scalars when there is none).
    pub fn scalars_before(&self) -> &[UnitId] {
        &self.scalars_before
    }

    pub fn repeating(&self) -> &[UnitId] {
        &self.repeating
    }

    pub fn scalars_after(&self) -> &[UnitId] {
        &self.scalars_after
    }

    /// All scalars, before-group first.
    pub fn scalars(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.scalars_before.iter().chain(&self.scalars_after).copied()
    }

    /// Order in which units are measured for content-driven tracks.
    pub fn auto_size_order(&self) -> &[UnitId] {
        &self.auto_size_order
    }

    pub fn len(&self) -> usize {
        self.auto_size_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auto_size_order.is_empty()
    }
}

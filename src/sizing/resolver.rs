//! Static grid sizing: resolve both axes of a template whose units are all
//! rendered once.
//!
//! Used for nested grids, where the whole child template is laid out inside
//! the parent unit's rectangle. Columns are sized first, then rows with the
//! column lengths known.

use crate::geometry::{Axis, Rect, Size};
use crate::template::Template;
use crate::track::GridRange;

use super::axis::AxisSizing;

// ---------------------------------------------------------------------------
// Occupant
// ---------------------------------------------------------------------------

/// Something placed on a grid range that can report a desired size.
pub trait Occupant {
    fn range(&self) -> GridRange;

    fn measure(&mut self, constraint: Size) -> Size;
}

// ---------------------------------------------------------------------------
// GridSizing
// ---------------------------------------------------------------------------

/// Resolved column and row lengths of one static grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSizing {
    axes: [AxisSizing; 2],
}

impl GridSizing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(&self, axis: Axis) -> &AxisSizing {
        &self.axes[axis.index()]
    }

    /// Resolve every track of `template` within `available`.
    ///
    /// `occupants` must be given in the template's auto-size order. Returns the
    /// extent: the sum of all resolved track lengths per axis.
    pub fn resolve(
        &mut self,
        template: &Template,
        available: Size,
        occupants: &mut [&mut dyn Occupant],
    ) -> Size {
        for axis in Axis::ALL {
            self.axes[axis.index()].begin(template.tracks(axis), available.get(axis), None);
        }

        for axis in Axis::ALL {
            let tracks = template.tracks(axis);
            let [this, other] = self.split(axis);

            for occupant in occupants.iter_mut() {
                let range = occupant.range();
                let span = range.span(axis);
                if !this.has_content(span) {
                    continue;
                }
                let across = other
                    .known_sum(range.span(axis.other()))
                    .unwrap_or(f64::INFINITY);
                let desired = occupant.measure(Size::from_axis(axis, f64::INFINITY, across));
                this.apply_excess(tracks, span, desired.get(axis));
            }
            this.finish_content();

            let length = available.get(axis);
            if length.is_finite() {
                let remaining = length - this.resolved_total();
                this.distribute(tracks, remaining);
            }
        }

        self.extent()
    }

    /// Sum of resolved track lengths per axis.
    pub fn extent(&self) -> Size {
        Size::new(
            self.axis(Axis::Horizontal).total(),
            self.axis(Axis::Vertical).total(),
        )
    }

    /// Rectangle covered by `range`, relative to the grid's origin.
    pub fn rect(&self, range: &GridRange) -> Rect {
        let span = |axis: Axis| {
            let sizing = self.axis(axis);
            let span = range.span(axis);
            (sizing.prefix(span.start), sizing.span_length(span))
        };
        Rect::from_spans(Axis::Horizontal, span(Axis::Horizontal), span(Axis::Vertical))
    }

    /// `[axis, axis.other()]`, both mutable.
    fn split(&mut self, axis: Axis) -> [&mut AxisSizing; 2] {
        let [horizontal, vertical] = &mut self.axes;
        match axis {
            Axis::Horizontal => [horizontal, vertical],
            Axis::Vertical => [vertical, horizontal],
        }
    }
}

//! Harness: builds a template and drives a coordinator without a host.
//!
//! The harness keeps a fixed viewport size and re-runs measure/arrange after
//! every interaction, the way a host's render loop would.

use std::ops::RangeInclusive;

use crate::config::LayoutConfig;
use crate::element::Element;
use crate::error::Result;
use crate::geometry::Size;
use crate::scroll::ScrollCoordinator;
use crate::template::{RepeatScope, Template, TemplateArena};

use super::elements::{ElementLog, FixedElement, TrackedElement};
use super::snapshot::layout_summary;

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// A generator of [`TrackedElement`]s with a fixed desired size.
pub fn tracked(log: &ElementLog, width: f64, height: f64) -> impl Fn() -> Box<dyn Element> + 'static {
    let log = log.clone();
    move || Box::new(TrackedElement::new(&log, FixedElement::new(width, height))) as Box<dyn Element>
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A coordinator plus the log of every element it created.
///
/// # Examples
///
/// ```
/// use gilt_grid::geometry::Size;
/// use gilt_grid::testing::Harness;
///
/// let mut harness = Harness::table(1000, 20.0, Size::new(100.0, 100.0));
/// harness.layout();
/// assert_eq!(harness.realized(), Some(0..=5));
/// harness.scroll_to(0.0, 20.0);
/// assert_eq!(harness.realized(), Some(1..=6));
/// ```
#[derive(Debug)]
pub struct Harness {
    coordinator: ScrollCoordinator,
    log: ElementLog,
    viewport: Size,
}

impl Harness {
    /// Build a template with `build`, seal it, and wrap it in a coordinator
    /// over `rows` data rows.
    pub fn build(
        rows: usize,
        viewport: Size,
        config: LayoutConfig,
        build: impl FnOnce(&mut Template, &ElementLog) -> Result<()>,
    ) -> Result<Self> {
        let log = ElementLog::new();
        let mut arena = TemplateArena::new();
        let id = arena.create();
        build(arena.template_mut(id)?, &log)?;
        arena.seal(id)?;
        let coordinator = ScrollCoordinator::with_config(arena, id, rows, config)?;
        Ok(Self {
            coordinator,
            log,
            viewport,
        })
    }

    /// A single-column table: one star column and `rows` data rows of
    /// `row_height`, each holding one tracked element.
    ///
    /// # Panics
    ///
    /// Panics if `row_height` is not a valid absolute length.
    pub fn table(rows: usize, row_height: f64, viewport: Size) -> Self {
        Self::build(rows, viewport, LayoutConfig::default(), |t, log| {
            t.add_column("*")?;
            t.add_row(&row_height.to_string())?;
            let cell = t.range(0, 0)?;
            t.set_repeat_range(cell)?;
            t.add_repeating(cell, RepeatScope::Row, tracked(log, 10.0, row_height))?;
            Ok(())
        })
        .expect("table template is valid")
    }

    pub fn coordinator(&self) -> &ScrollCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ScrollCoordinator {
        &mut self.coordinator
    }

    pub fn log(&self) -> &ElementLog {
        &self.log
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Run measure and arrange at the current viewport size.
    pub fn layout(&mut self) -> Size {
        self.coordinator.measure_and_arrange(self.viewport)
    }

    /// Change the viewport size and lay out again.
    pub fn resize(&mut self, viewport: Size) -> Size {
        self.viewport = viewport;
        self.layout()
    }

    /// Scroll to an absolute offset and refresh. Returns whether a pass ran.
    pub fn scroll_to(&mut self, x: f64, y: f64) -> bool {
        self.coordinator.set_horizontal_offset(x);
        self.coordinator.set_vertical_offset(y);
        self.coordinator.refresh()
    }

    /// Scroll by a delta and refresh. Returns whether a pass ran.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> bool {
        self.coordinator.scroll_by(dx, dy);
        self.coordinator.refresh()
    }

    /// Realized block ordinals.
    pub fn realized(&self) -> Option<RangeInclusive<usize>> {
        self.coordinator.realized_range()
    }

    /// Text summary of the last arrange.
    pub fn summary(&self) -> String {
        layout_summary(&self.coordinator)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::LifecycleEvent;

    #[test]
    fn table_realizes_viewport_plus_one() {
        let mut harness = Harness::table(1000, 20.0, Size::new(100.0, 100.0));
        assert_eq!(harness.layout(), Size::new(100.0, 100.0));
        assert_eq!(harness.realized(), Some(0..=5));
        assert_eq!(harness.log().created(), 6);
    }

    #[test]
    fn scroll_without_change_runs_no_pass() {
        let mut harness = Harness::table(10, 20.0, Size::new(100.0, 100.0));
        harness.layout();
        assert!(!harness.scroll_to(0.0, 0.0));
        assert!(harness.scroll_by(0.0, 40.0));
        assert_eq!(harness.coordinator().vertical_offset(), 40.0);
    }

    #[test]
    fn resize_grows_the_window() {
        let mut harness = Harness::table(1000, 20.0, Size::new(100.0, 100.0));
        harness.layout();
        harness.log().clear();
        harness.resize(Size::new(100.0, 200.0));
        assert_eq!(harness.realized(), Some(0..=10));
        assert_eq!(harness.log().count(|e| matches!(e, LifecycleEvent::Created { .. })), 5);
    }
}

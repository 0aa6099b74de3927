//! Integration tests for gilt-grid.
//!
//! These tests exercise the public API from outside the crate: templates are
//! built, sealed, and laid out through a coordinator, and the results are
//! checked through the testing harness.

use std::sync::{Arc, Mutex};

use gilt_grid::element::Element;
use gilt_grid::geometry::{Axis, Rect, Size};
use gilt_grid::testing::{tracked, FnElement, Harness, LifecycleEvent};
use gilt_grid::{EstimatePolicy, LayoutConfig, RepeatScope, RowChange};
use pretty_assertions::assert_eq;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::EnvFilter;

/// Send engine logs to the test output. `RUST_LOG=gilt_grid=trace` shows
/// every block the window realizes or virtualizes.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn viewport() -> Size {
    Size::new(100.0, 100.0)
}

fn window_len(harness: &Harness) -> usize {
    harness.realized().map_or(0, |range| range.count())
}

// ---------------------------------------------------------------------------
// Virtualization
// ---------------------------------------------------------------------------

#[test]
fn thousand_rows_keep_six_realized() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    assert_eq!(harness.realized(), Some(0..=5));
    assert_eq!(harness.coordinator().extent_size(), Size::new(100.0, 20000.0));

    for offset in [20.0, 40.0, 500.0, 10000.0, 19000.0, 60.0] {
        harness.scroll_to(0.0, offset);
        assert_eq!(window_len(&harness), 6, "offset {offset}");
    }
}

#[test]
fn scrolling_one_row_swaps_one_block() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    let before = harness.coordinator().stats();

    harness.scroll_by(0.0, 20.0);
    let after = harness.coordinator().stats();
    assert_eq!(harness.realized(), Some(1..=6));
    assert_eq!(after.realized - before.realized, 1);
    assert_eq!(after.virtualized - before.virtualized, 1);
    assert_eq!(after.created, before.created);
    assert_eq!(after.reused - before.reused, 1);

    harness.scroll_by(0.0, -20.0);
    assert_eq!(harness.realized(), Some(0..=5));
    assert_eq!(harness.log().created(), 6);
}

#[test]
fn jumps_recycle_instead_of_creating() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    harness.scroll_to(0.0, 8000.0);
    assert_eq!(harness.realized(), Some(400..=405));
    assert_eq!(harness.log().created(), 6);
    assert!(harness
        .log()
        .events()
        .iter()
        .any(|e| matches!(e, LifecycleEvent::Initialized { row: Some(400), .. })));
}

#[test]
fn end_of_data_keeps_a_spare_block_in_front() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    harness.scroll_to(0.0, 1e9);
    assert_eq!(harness.coordinator().vertical_offset(), 19900.0);
    assert_eq!(harness.realized(), Some(994..=999));

    // Scrolling back from the end keeps six blocks.
    harness.scroll_by(0.0, -20.0);
    assert_eq!(harness.realized(), Some(994..=999));
    harness.scroll_by(0.0, -20.0);
    assert_eq!(harness.realized(), Some(993..=998));
}

#[test]
fn overscan_realizes_extra_blocks() {
    let mut harness = Harness::build(1000, viewport(), LayoutConfig::new().with_overscan(2), |t, log| {
        t.add_column("*")?;
        t.add_row("20")?;
        let cell = t.range(0, 0)?;
        t.set_repeat_range(cell)?;
        t.add_repeating(cell, RepeatScope::Row, tracked(log, 10.0, 20.0))?;
        Ok(())
    })
    .unwrap();
    harness.layout();
    assert_eq!(harness.realized(), Some(0..=7));
}

// ---------------------------------------------------------------------------
// Scroll state
// ---------------------------------------------------------------------------

#[test]
fn offsets_clamp_to_scrollable_range() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    let coordinator = harness.coordinator_mut();
    for (value, expected) in [(-10.0, 0.0), (0.0, 0.0), (123.5, 123.5), (19900.0, 19900.0), (5e6, 19900.0)] {
        coordinator.set_vertical_offset(value);
        assert_eq!(coordinator.vertical_offset(), expected);
    }
    coordinator.set_horizontal_offset(50.0);
    assert_eq!(coordinator.horizontal_offset(), 0.0);
}

#[test]
fn invalidations_coalesce_into_one_pass() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    let generation = harness.coordinator().generation();
    assert!(!harness.coordinator().is_dirty());

    let coordinator = harness.coordinator_mut();
    coordinator.set_vertical_offset(100.0);
    coordinator.set_vertical_offset(200.0);
    coordinator.scroll_by(0.0, 20.0);
    coordinator.set_current_row(Some(3));
    assert!(coordinator.is_dirty());
    assert!(coordinator.refresh());
    assert!(!coordinator.refresh());
    assert_eq!(coordinator.generation(), generation + 1);
    assert_eq!(harness.realized(), Some(11..=16));
}

#[test]
fn bring_row_into_view_scrolls_minimally() {
    let mut harness = Harness::table(1000, 20.0, viewport());
    harness.layout();
    let coordinator = harness.coordinator_mut();

    let rect = coordinator.bring_row_into_view(50).unwrap();
    assert_eq!(rect, Rect::new(0.0, 80.0, 100.0, 20.0));
    assert_eq!(coordinator.vertical_offset(), 920.0);

    // Already visible: no movement.
    let rect = coordinator.bring_row_into_view(48).unwrap();
    assert_eq!(rect, Rect::new(0.0, 40.0, 100.0, 20.0));
    assert_eq!(coordinator.vertical_offset(), 920.0);

    assert!(coordinator.refresh());
    assert_eq!(harness.realized(), Some(46..=51));
    assert!(harness.coordinator_mut().row_rect(1000).is_none());
}

// ---------------------------------------------------------------------------
// Track sizing
// ---------------------------------------------------------------------------

#[test]
fn fixed_star_auto_rows() {
    let mut harness = Harness::build(0, Size::new(100.0, 200.0), LayoutConfig::new(), |t, log| {
        t.add_column("*")?;
        t.add_row("20")?;
        t.add_row("*")?;
        t.add_row("Auto")?;
        t.add_scalar(t.range(0, 2)?, tracked(log, 10.0, 30.0))?;
        Ok(())
    })
    .unwrap();
    harness.layout();

    let coordinator = harness.coordinator();
    let rows = coordinator.track_lengths(Axis::Vertical);
    assert_eq!(rows, &[20.0, 150.0, 30.0]);
    assert_eq!(rows.iter().sum::<f64>(), coordinator.extent_size().height);
    assert_eq!(coordinator.arranged()[0].rect, Rect::new(0.0, 170.0, 100.0, 30.0));
}

#[test]
fn track_lengths_add_up_to_extent() {
    let mut harness = Harness::build(0, Size::new(300.0, 90.0), LayoutConfig::new(), |t, log| {
        t.add_column("40")?;
        t.add_column("*")?;
        t.add_column("2*")?;
        t.add_column("Auto")?;
        t.add_row("Auto")?;
        t.add_scalar(t.range(3, 0)?, tracked(log, 35.0, 12.0))?;
        t.add_scalar(t.range_span(0, 0, 1, 0)?, tracked(log, 10.0, 7.0))?;
        Ok(())
    })
    .unwrap();
    harness.layout();

    let coordinator = harness.coordinator();
    let columns = coordinator.track_lengths(Axis::Horizontal);
    assert_eq!(columns, &[40.0, 75.0, 150.0, 35.0]);
    for axis in Axis::ALL {
        let sum: f64 = coordinator.track_lengths(axis).iter().sum();
        assert!((sum - coordinator.extent_size().get(axis)).abs() < 1e-6);
    }
}

#[test]
fn variable_row_heights_use_realized_average() {
    let config = LayoutConfig::new().with_estimate(EstimatePolicy::RealizedAverage);
    let mut harness = Harness::build(1000, viewport(), config, |t, _| {
        t.add_column("*")?;
        t.add_row("Auto")?;
        let cell = t.range(0, 0)?;
        t.set_repeat_range(cell)?;
        t.add_repeating(cell, RepeatScope::Row, || {
            Box::new(FnElement::new(|row: Option<usize>, _| {
                Size::new(10.0, if row.unwrap_or(0) % 2 == 0 { 20.0 } else { 40.0 })
            })) as Box<dyn Element>
        })?;
        Ok(())
    })
    .unwrap();
    harness.layout();

    let coordinator = harness.coordinator_mut();
    assert_eq!(coordinator.realized_range(), Some(0..=3));
    assert_eq!(coordinator.blocks_length(), 996.0 * 30.0 + 120.0);
    assert_eq!(coordinator.extent_size().height, 30000.0);
    assert_eq!(coordinator.row_rect(1), Some(Rect::new(0.0, 20.0, 100.0, 40.0)));
    assert_eq!(coordinator.row_rect(2), Some(Rect::new(0.0, 60.0, 100.0, 20.0)));
}

/// 1000 content-sized rows, 60/10/10 tall by `row % 3`.
fn uneven_rows(estimate: EstimatePolicy) -> Harness {
    let config = LayoutConfig::new().with_estimate(estimate);
    Harness::build(1000, viewport(), config, |t, _| {
        t.add_column("*")?;
        t.add_row("Auto")?;
        let cell = t.range(0, 0)?;
        t.set_repeat_range(cell)?;
        t.add_repeating(cell, RepeatScope::Row, || {
            Box::new(FnElement::new(|row: Option<usize>, _| {
                Size::new(10.0, if row.unwrap_or(0) % 3 == 0 { 60.0 } else { 10.0 })
            })) as Box<dyn Element>
        })?;
        Ok(())
    })
    .unwrap()
}

/// The realized rows sit back to back and cover the whole viewport.
fn assert_viewport_covered(harness: &mut Harness) {
    let offset = harness.coordinator().vertical_offset();
    let rows = harness.realized().unwrap();
    let coordinator = harness.coordinator_mut();
    let rects: Vec<Rect> = rows.clone().map(|row| coordinator.row_rect(row).unwrap()).collect();
    for pair in rects.windows(2) {
        let gap = pair[1].y - (pair[0].y + pair[0].height);
        assert!(gap.abs() < 1e-6, "offset {offset}: gap in {rows:?}");
    }
    let top = rects[0].y;
    let bottom = rects[rects.len() - 1].y + rects[rects.len() - 1].height;
    assert!(
        top <= 1e-6 && bottom >= 100.0 - 1e-6,
        "offset {offset}: rows {rows:?} cover {top}..{bottom}"
    );
}

#[test]
fn content_sized_rows_keep_the_viewport_covered() {
    init_tracing();
    for estimate in [EstimatePolicy::LastMeasured, EstimatePolicy::RealizedAverage] {
        let mut harness = uneven_rows(estimate);
        harness.layout();
        assert_viewport_covered(&mut harness);

        for offset in [500.0, 5000.0, 5010.0, 5020.0, 30.0, 12000.0, 1e9] {
            harness.scroll_to(0.0, offset);
            assert_viewport_covered(&mut harness);
            assert!(window_len(&harness) > 1, "{estimate:?} at {offset}");
        }
    }
}

#[test]
fn content_sized_rows_stay_put_while_scrolling_back() {
    init_tracing();
    let mut harness = uneven_rows(EstimatePolicy::LastMeasured);
    harness.layout();
    harness.scroll_to(0.0, 5000.0);
    let row = *harness.realized().unwrap().start();
    let before = harness.coordinator_mut().row_rect(row).unwrap();

    // Rows realized in front never move the rows already on screen.
    harness.scroll_by(0.0, -25.0);
    assert_viewport_covered(&mut harness);
    let after = harness.coordinator_mut().row_rect(row).unwrap();
    assert_eq!(after.y, before.y + 25.0);

    for _ in 0..60 {
        harness.scroll_by(0.0, -100.0);
        assert_viewport_covered(&mut harness);
    }
    assert_eq!(harness.coordinator().vertical_offset(), 0.0);
    assert_eq!(harness.realized(), Some(0..=3));
}

#[test]
fn content_sized_extent_is_steady_without_changes() {
    let mut harness = uneven_rows(EstimatePolicy::LastMeasured);
    harness.layout();
    harness.scroll_to(0.0, 500.0);
    let extent = harness.coordinator().extent_size();
    harness.coordinator_mut().invalidate();
    assert!(harness.coordinator_mut().refresh());
    assert_eq!(harness.coordinator().extent_size(), extent);
    assert_viewport_covered(&mut harness);
}

// ---------------------------------------------------------------------------
// Pinned regions
// ---------------------------------------------------------------------------

fn pinned_table() -> Harness {
    Harness::build(100, viewport(), LayoutConfig::new(), |t, log| {
        t.add_column("*")?;
        t.add_row("20")?;
        t.add_row("20")?;
        t.add_row("10")?;
        t.set_pinned(Axis::Vertical, 1, 1)?;
        t.add_scalar(t.range(0, 0)?, tracked(log, 10.0, 20.0))?;
        let cell = t.range(0, 1)?;
        t.set_repeat_range(cell)?;
        t.add_repeating(cell, RepeatScope::Row, tracked(log, 10.0, 20.0))?;
        t.add_scalar(t.range(0, 2)?, tracked(log, 10.0, 10.0))?;
        Ok(())
    })
    .unwrap()
}

#[test]
fn pinned_header_and_footer_stay_at_the_edges() {
    let mut harness = pinned_table();
    harness.layout();
    assert_eq!(harness.coordinator().extent_size().height, 2030.0);
    // Scrollable viewport is 70 tall: rows 0..=3 cover it.
    assert_eq!(harness.realized(), Some(0..=3));

    harness.scroll_to(0.0, 500.0);
    insta::assert_snapshot!(harness.summary(), @r"
    scalar 0        0,0 100x20 pinned
    scalar 1        0,90 100x10 pinned
    row 25 unit 0   0,20 100x20
    row 26 unit 0   0,40 100x20
    row 27 unit 0   0,60 100x20
    row 28 unit 0   0,80 100x20
    ");
}

#[test]
fn make_visible_avoids_pinned_tracks() {
    let mut harness = pinned_table();
    harness.layout();
    harness.scroll_to(0.0, 500.0);

    let coordinator = harness.coordinator_mut();
    // Row 25 starts right below the header; row 24 is hidden under it.
    let rect = coordinator.bring_row_into_view(24).unwrap();
    assert_eq!(rect.y, 20.0);
    assert_eq!(coordinator.vertical_offset(), 480.0);
    // Row 30 ends at content 640; the footer covers the last 10 of the viewport.
    let rect = coordinator.bring_row_into_view(30).unwrap();
    assert_eq!(rect.y + rect.height, 90.0);
    assert_eq!(coordinator.vertical_offset(), 550.0);
}

// ---------------------------------------------------------------------------
// Data changes
// ---------------------------------------------------------------------------

#[test]
fn row_changes_update_count_and_current_row() {
    let mut harness = Harness::table(10, 20.0, viewport());
    harness.layout();
    let coordinator = harness.coordinator_mut();
    coordinator.set_current_row(Some(3));

    coordinator.apply(RowChange::Removed(0));
    assert_eq!(coordinator.row_count(), 9);
    assert_eq!(coordinator.current_row(), Some(2));
    assert!(coordinator.is_dirty());
    assert!(coordinator.refresh());
    assert_eq!(coordinator.extent_size().height, 180.0);
    assert_eq!(coordinator.realized_range(), Some(0..=5));

    coordinator.apply(RowChange::Inserted(0));
    assert_eq!(coordinator.current_row(), Some(3));
    coordinator.apply(RowChange::Removed(3));
    assert_eq!(coordinator.current_row(), None);
    coordinator.apply(RowChange::Reset(2));
    coordinator.refresh();
    assert_eq!(coordinator.realized_range(), Some(0..=1));
    assert_eq!(coordinator.extent_size().height, 40.0);

    // Every rebind reused pooled instances.
    assert_eq!(harness.log().created(), 6);
}

#[test]
fn current_row_reaches_elements() {
    let mut harness = Harness::table(20, 20.0, viewport());
    harness.layout();
    harness.coordinator_mut().set_current_row(Some(8));
    harness.scroll_to(0.0, 60.0);
    assert_eq!(harness.realized(), Some(3..=8));
    assert_eq!(
        harness.log().count(|e| matches!(
            e,
            LifecycleEvent::Initialized { row: Some(8), is_current: true, .. }
        )),
        1
    );
}

#[test]
fn empty_collection_lays_out_static_tracks_only() {
    let mut harness = pinned_table();
    harness.coordinator_mut().apply(RowChange::Reset(0));
    harness.layout();
    assert_eq!(harness.realized(), None);
    assert_eq!(harness.coordinator().extent_size().height, 30.0);
    assert_eq!(harness.coordinator().arranged().len(), 2);
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Collects the messages of WARN events.
#[derive(Clone, Default)]
struct WarnCapture(Arc<Mutex<Vec<String>>>);

impl WarnCapture {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.0.lock().unwrap().push(message);
        }
    }
}

#[test]
fn removing_a_missing_row_warns_and_changes_nothing() {
    let mut harness = Harness::table(10, 20.0, viewport());
    harness.layout();

    let capture = WarnCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, || {
        harness.coordinator_mut().apply(RowChange::Removed(50));
    });

    assert_eq!(harness.coordinator().row_count(), 10);
    assert!(!harness.coordinator().is_dirty());
    assert_eq!(capture.messages(), vec!["removed row does not exist".to_string()]);
}

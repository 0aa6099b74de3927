//! ScrollCoordinator: owns scroll state and runs layout passes.
//!
//! A layout pass resolves cross-axis tracks, then main-axis tracks and the
//! per-block lengths of realized blocks, then moves the realized window to
//! cover the scrollable part of the viewport. Newly realized blocks are
//! measured right away and the pass repeats until the window stops moving.
//! Arrangement maps content coordinates to viewport coordinates, keeping
//! pinned tracks at the viewport edges.

use std::ops::RangeInclusive;

use crate::config::{EstimatePolicy, LayoutConfig};
use crate::data::RowChange;
use crate::element::{BindContext, Instance};
use crate::error::Result;
use crate::geometry::{Axis, Rect, Size};
use crate::sizing::{AxisSizing, VariantLengthTracker};
use crate::template::{Template, TemplateArena, TemplateId, UnitId, UnitRegistry};
use crate::track::{GridRange, Span};
use crate::virtualize::{ElementCollection, RealizeContext, VirtualizeStats, VisualKey, Virtualizer};

use super::flow::{BlockLayout, CrossMap};
use super::invalidation::{Invalidation, InvalidationReason};
use super::state::ScrollState;

// ---------------------------------------------------------------------------
// Arranged output
// ---------------------------------------------------------------------------

/// Identity of one arranged element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualId {
    /// The single instance of a scalar unit.
    Scalar(UnitId),
    /// A block-scope unit in block `block`.
    Block { block: usize, unit: UnitId },
    /// A row-scope unit bound to data row `row`.
    Row { row: usize, unit: UnitId },
}

/// Where an element was placed in the last arrange, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangedElement {
    pub id: VisualId,
    pub rect: Rect,
    /// Whether the element belongs to the pinned (non-scrolling) collection.
    pub pinned: bool,
}

/// A scalar unit and its only instance.
#[derive(Debug)]
struct ScalarSlot {
    unit: UnitId,
    range: GridRange,
    instance: Instance,
    pinned: bool,
}

/// Parameters of the block positions along the flow axis.
#[derive(Debug, Clone, Copy)]
struct BlockGeometry {
    head: f64,
    block_count: usize,
    policy: EstimatePolicy,
}

impl BlockGeometry {
    fn layout<'a>(&self, tracker: &'a mut VariantLengthTracker) -> BlockLayout<'a> {
        BlockLayout::new(tracker, self.head, self.block_count, self.policy)
    }
}

// ---------------------------------------------------------------------------
// ScrollCoordinator
// ---------------------------------------------------------------------------

/// Lays out one sealed template over a row collection inside a scrolling viewport.
#[derive(Debug)]
pub struct ScrollCoordinator {
    arena: TemplateArena,
    template: TemplateId,
    registry: UnitRegistry,
    config: LayoutConfig,
    row_count: usize,
    current_row: Option<usize>,
    scalars: Vec<ScalarSlot>,
    virtualizer: Virtualizer,
    sizing: [AxisSizing; 2],
    blocks_length: f64,
    scroll: ScrollState,
    invalidation: Invalidation,
    available: Option<Size>,
    desired: Size,
    arranged: Vec<ArrangedElement>,
}

impl ScrollCoordinator {
    /// Create a coordinator for `template` with the default config.
    pub fn new(arena: TemplateArena, template: TemplateId, row_count: usize) -> Result<Self> {
        Self::with_config(arena, template, row_count, LayoutConfig::default())
    }

    /// Create a coordinator for `template`.
    ///
    /// Scalar units are instantiated and initialized immediately; blocks are
    /// realized by the first layout pass.
    pub fn with_config(
        arena: TemplateArena,
        template: TemplateId,
        row_count: usize,
        config: LayoutConfig,
    ) -> Result<Self> {
        let tpl = arena.template(template)?;
        let registry = tpl.registry()?.clone();

        let mut scalars = Vec::new();
        for id in registry.scalars() {
            let Some(unit) = tpl.unit(id) else { continue };
            let range = unit.range();
            let mut instance = Instance::generate(&arena, unit);
            instance.initialize(&BindContext::SCALAR);
            scalars.push(ScalarSlot {
                unit: id,
                range,
                instance,
                pinned: is_pinned(tpl, &range),
            });
        }
        let scrolling = |ids: &[UnitId]| -> Vec<UnitId> {
            ids.iter()
                .copied()
                .filter(|id| scalars.iter().any(|slot| slot.unit == *id && !slot.pinned))
                .collect()
        };
        let collection = ElementCollection::new(
            scrolling(registry.scalars_before()),
            scrolling(registry.scalars_after()),
        );
        let virtualizer = Virtualizer::new(tpl, collection);

        tracing::debug!(
            rows = row_count,
            blocks = tpl.block_count(row_count),
            scalars = scalars.len(),
            "scroll coordinator created"
        );
        Ok(Self {
            arena,
            template,
            registry,
            config,
            row_count,
            current_row: None,
            scalars,
            virtualizer,
            sizing: [AxisSizing::new(), AxisSizing::new()],
            blocks_length: 0.0,
            scroll: ScrollState::default(),
            invalidation: Invalidation::new(),
            available: None,
            desired: Size::ZERO,
            arranged: Vec::new(),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn arena(&self) -> &TemplateArena {
        &self.arena
    }

    pub fn template_id(&self) -> TemplateId {
        self.template
    }

    /// The laid-out template.
    pub fn template(&self) -> &Template {
        &self.arena[self.template]
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn current_row(&self) -> Option<usize> {
        self.current_row
    }

    /// Total content size, including estimated unrealized blocks.
    pub fn extent_size(&self) -> Size {
        self.scroll.extent()
    }

    /// Available size of the last layout pass.
    pub fn viewport_size(&self) -> Size {
        self.scroll.viewport()
    }

    pub fn horizontal_offset(&self) -> f64 {
        self.scroll.offset().x
    }

    pub fn vertical_offset(&self) -> f64 {
        self.scroll.offset().y
    }

    /// Elements placed by the last arrange: pinned ones first, then the
    /// scrollable collection in order.
    pub fn arranged(&self) -> &[ArrangedElement] {
        &self.arranged
    }

    /// Realized block ordinals.
    pub fn realized_range(&self) -> Option<RangeInclusive<usize>> {
        self.virtualizer.window().bounds().map(|(first, last)| first..=last)
    }

    /// Data rows bound to realized blocks.
    pub fn realized_rows(&self) -> Option<RangeInclusive<usize>> {
        let (first, last) = self.virtualizer.window().bounds()?;
        let dims = self.template().block_dimensions();
        let end = ((last + 1) * dims).min(self.row_count);
        (end > first * dims).then(|| first * dims..=end - 1)
    }

    pub fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    pub fn stats(&self) -> VirtualizeStats {
        self.virtualizer.stats()
    }

    /// Resolved static track lengths of `axis` from the last pass.
    ///
    /// On the flow axis the tracks of the repeat range read zero; their
    /// lengths vary per block and add up to [`blocks_length`](Self::blocks_length).
    pub fn track_lengths(&self, axis: Axis) -> &[f64] {
        self.sizing[axis.index()].lengths()
    }

    /// Main-axis length of all blocks, realized and estimated.
    pub fn blocks_length(&self) -> f64 {
        self.blocks_length
    }

    pub fn is_dirty(&self) -> bool {
        self.invalidation.is_dirty()
    }

    /// Number of completed layout passes.
    pub fn generation(&self) -> u64 {
        self.invalidation.generation()
    }

    // ── Host surface ─────────────────────────────────────────────────

    /// Run a layout pass if needed and return the desired size.
    pub fn measure(&mut self, available: Size) -> Size {
        self.set_available(available);
        if self.invalidation.is_dirty() {
            self.layout_pass(available);
        }
        self.desired
    }

    /// Place every realized, scalar, and pinned element.
    pub fn arrange(&mut self, final_size: Size) {
        self.set_available(final_size);
        if self.invalidation.is_dirty() {
            self.layout_pass(final_size);
        }
        self.arrange_elements();
    }

    pub fn measure_and_arrange(&mut self, available: Size) -> Size {
        let desired = self.measure(available);
        self.arrange(available);
        desired
    }

    /// Re-run layout with the last available size if anything changed.
    /// Returns whether a pass ran.
    pub fn refresh(&mut self) -> bool {
        if !self.invalidation.is_dirty() {
            return false;
        }
        let Some(available) = self.available else {
            return false;
        };
        self.measure_and_arrange(available);
        true
    }

    /// Request a new pass because element content changed.
    pub fn invalidate(&mut self) {
        self.invalidation.invalidate(InvalidationReason::Content);
    }

    fn set_available(&mut self, available: Size) {
        if self.available != Some(available) {
            self.available = Some(available);
            self.invalidation.invalidate(InvalidationReason::Viewport);
        }
    }

    // ── Scrolling ────────────────────────────────────────────────────

    pub fn set_horizontal_offset(&mut self, value: f64) {
        self.set_offset(Axis::Horizontal, value);
    }

    pub fn set_vertical_offset(&mut self, value: f64) {
        self.set_offset(Axis::Vertical, value);
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        let offset = self.scroll.offset();
        self.set_offset(Axis::Horizontal, offset.x + dx);
        self.set_offset(Axis::Vertical, offset.y + dy);
    }

    fn set_offset(&mut self, axis: Axis, value: f64) {
        let before = self.scroll.offset().get(axis);
        self.scroll.set_offset(axis, value);
        if (self.scroll.offset().get(axis) - before).abs() > self.config.tolerance {
            self.invalidation.invalidate(InvalidationReason::Offset);
        }
    }

    /// Scroll the least amount that shows `rect` (content coordinates) in the
    /// scrollable part of the viewport, and return it in viewport coordinates.
    pub fn make_visible(&mut self, rect: Rect) -> Rect {
        let before = self.scroll.offset();
        self.scroll.make_visible(rect, self.pinned_insets());
        let after = self.scroll.offset();
        if (after.x - before.x).abs() > self.config.tolerance
            || (after.y - before.y).abs() > self.config.tolerance
        {
            self.invalidation.invalidate(InvalidationReason::Offset);
        }
        rect.translate(-after)
    }

    /// Content rectangle of data row `row`, realized or estimated.
    ///
    /// `None` before the first layout pass or when the row does not exist.
    pub fn row_rect(&mut self, row: usize) -> Option<Rect> {
        if row >= self.row_count || self.invalidation.generation() == 0 {
            return None;
        }
        let tpl = &self.arena[self.template];
        let flow = tpl.flow();
        let cross = flow.other();
        let dims = tpl.block_dimensions();
        let cross_span = tpl.repeat_span(cross)?;
        let geometry = self.block_geometry();
        let (block, slot) = (row / dims, row % dims);

        let mut layout = geometry.layout(self.virtualizer.lengths_mut());
        let main = (layout.start(block), layout.length(block));
        let map = CrossMap::new(&self.sizing[cross.index()], Some(cross_span), dims);
        Some(Rect::from_spans(flow, main, map.span(cross_span, (slot, slot))))
    }

    /// Scroll `row` into view. Returns its rectangle in viewport coordinates.
    pub fn bring_row_into_view(&mut self, row: usize) -> Option<Rect> {
        let rect = self.row_rect(row)?;
        Some(self.make_visible(rect))
    }

    // ── Data ─────────────────────────────────────────────────────────

    /// Apply a change to the row collection.
    pub fn apply(&mut self, change: RowChange) {
        if let RowChange::Removed(at) = change {
            if at >= self.row_count {
                tracing::warn!(row = at, rows = self.row_count, "removed row does not exist");
                return;
            }
        }
        let dims = self.template().block_dimensions();
        match change {
            RowChange::Reset(_) => self.virtualizer.virtualize_all(),
            _ => self.virtualizer.virtualize_from(change.first_affected() / dims),
        }
        self.row_count = change.apply_to(self.row_count);
        self.current_row = self.current_row.and_then(|row| change.shift(row));
        tracing::debug!(?change, rows = self.row_count, "rows changed");
        self.invalidation.invalidate(InvalidationReason::Rows);
    }

    /// Mark `row` as the row being edited.
    pub fn set_current_row(&mut self, row: Option<usize>) {
        let row = row.filter(|&row| row < self.row_count);
        if self.current_row != row {
            self.current_row = row;
            self.invalidation.invalidate(InvalidationReason::CurrentRow);
        }
    }

    // ── Layout pass ──────────────────────────────────────────────────

    fn layout_pass(&mut self, available: Size) {
        let _span = tracing::debug_span!(
            "layout_pass",
            width = available.width,
            height = available.height,
            generation = self.invalidation.generation()
        )
        .entered();

        self.refresh_elements();
        self.scroll.set_viewport(available);

        let max_rounds = self.config.max_layout_iterations.max(1);
        let mut rounds = 0;
        let mut stable = false;
        while rounds < max_rounds {
            rounds += 1;
            self.resolve(available);
            if !self.adjust_window() {
                stable = true;
                break;
            }
        }
        if !stable {
            tracing::warn!(rounds, "realized window did not settle");
            self.resolve(available);
            if self.adjust_window() {
                self.resolve(available);
            }
        }

        let extent = self.scroll.extent();
        let fit = |axis: Axis| {
            let limit = available.get(axis);
            if limit.is_finite() {
                extent.get(axis).min(limit)
            } else {
                extent.get(axis)
            }
        };
        self.desired = Size::new(fit(Axis::Horizontal), fit(Axis::Vertical));
        self.invalidation.complete();

        tracing::debug!(
            rounds,
            window = ?self.virtualizer.window().bounds(),
            extent_width = extent.width,
            extent_height = extent.height,
            "layout pass complete"
        );
    }

    fn refresh_elements(&mut self) {
        for slot in &mut self.scalars {
            slot.instance.refresh(&BindContext::SCALAR);
        }
        let current_row = self.current_row;
        for (_, block) in self.virtualizer.window_mut().iter_mut() {
            block.refresh(current_row);
        }
    }

    fn block_geometry(&self) -> BlockGeometry {
        let tpl = &self.arena[self.template];
        let flow = tpl.flow();
        let head = tpl
            .repeat_span(flow)
            .map_or(0.0, |span| self.sizing[flow.index()].prefix(span.start));
        BlockGeometry {
            head,
            block_count: tpl.block_count(self.row_count),
            policy: self.config.estimate,
        }
    }

    /// Resolve track lengths and per-block lengths, then update the extent.
    fn resolve(&mut self, available: Size) {
        let Self {
            arena,
            template,
            registry,
            config,
            row_count,
            scalars,
            virtualizer,
            sizing,
            blocks_length,
            scroll,
            ..
        } = self;
        let arena: &TemplateArena = arena;
        let registry: &UnitRegistry = registry;
        let tpl = &arena[*template];
        let flow = tpl.flow();
        let cross = flow.other();
        let dims = tpl.block_dimensions();
        let main_repeat = tpl.repeat_span(flow);
        let cross_repeat = tpl.repeat_span(cross);

        let [horizontal, vertical] = sizing;
        let (main_sizing, cross_sizing) = match flow {
            Axis::Vertical => (vertical, horizontal),
            Axis::Horizontal => (horizontal, vertical),
        };
        cross_sizing.begin(tpl.tracks(cross), available.get(cross), None);
        main_sizing.begin(tpl.tracks(flow), available.get(flow), main_repeat);

        // Cross axis: content tracks, then stars.
        for &id in registry.auto_size_order() {
            let Some(unit) = tpl.unit(id) else { continue };
            let range = unit.range();
            let span = range.span(cross);
            if !cross_sizing.has_content(span) {
                continue;
            }
            let main_span = range.span(flow);
            if unit.is_scalar() {
                let Some(slot) = scalars.iter_mut().find(|slot| slot.unit == id) else {
                    continue;
                };
                let across = main_sizing.known_sum(main_span).unwrap_or(f64::INFINITY);
                let desired = slot
                    .instance
                    .measure(arena, Size::from_axis(cross, f64::INFINITY, across));
                cross_sizing.apply_excess(tpl.tracks(cross), span, desired.get(cross));
            } else {
                let (blocks, lengths) = virtualizer.blocks_and_lengths_mut();
                let across = lengths.fixed_span_sum(main_span).unwrap_or(f64::INFINITY);
                let constraint = Size::from_axis(cross, f64::INFINITY, across);
                for (_, block) in blocks {
                    for (_, instance) in block.instances_mut(id) {
                        let desired = instance.measure(arena, constraint);
                        cross_sizing.apply_excess(tpl.tracks(cross), span, desired.get(cross));
                    }
                }
            }
        }
        cross_sizing.finish_content();
        let cross_available = available.get(cross);
        if cross_available.is_finite() {
            let repeat_len = cross_repeat.map_or(0.0, |span| cross_sizing.span_length(span));
            let reserved = dims.saturating_sub(1) as f64 * repeat_len;
            let remaining = cross_available - cross_sizing.resolved_total() - reserved;
            cross_sizing.distribute(tpl.tracks(cross), remaining);
        }
        let cross_map = CrossMap::new(cross_sizing, cross_repeat, dims);

        // Main axis: static content tracks, realized blocks, then stars.
        for &id in registry.auto_size_order() {
            let Some(unit) = tpl.unit(id) else { continue };
            if !unit.is_scalar() {
                continue;
            }
            let range = unit.range();
            let span = range.span(flow);
            if !main_sizing.has_content(span) {
                continue;
            }
            let Some(slot) = scalars.iter_mut().find(|slot| slot.unit == id) else {
                continue;
            };
            let (_, across) = cross_map.span(range.span(cross), cross_map.all_slots());
            let desired = slot
                .instance
                .measure(arena, Size::from_axis(flow, f64::INFINITY, across));
            main_sizing.apply_excess(tpl.tracks(flow), span, desired.get(flow));
        }
        main_sizing.finish_content();

        let realized: Vec<usize> = virtualizer.window().iter().map(|(block, _)| block).collect();
        for block in realized {
            measure_block(arena, tpl, registry, &cross_map, virtualizer, block);
        }

        let geometry = BlockGeometry {
            head: 0.0,
            block_count: tpl.block_count(*row_count),
            policy: config.estimate,
        };
        *blocks_length = geometry.layout(virtualizer.lengths_mut()).total();

        let main_available = available.get(flow);
        if main_available.is_finite() {
            let remaining = main_available - main_sizing.resolved_total() - *blocks_length;
            main_sizing.distribute(tpl.tracks(flow), remaining);
        }

        let extent = Size::from_axis(flow, main_sizing.total() + *blocks_length, cross_map.extent());
        scroll.set_extent(extent);
    }

    /// Move the realized window to cover the scrollable viewport.
    /// Returns whether any block was realized or virtualized.
    fn adjust_window(&mut self) -> bool {
        let geometry = self.block_geometry();
        let insets = self.pinned_insets();
        let Self {
            arena,
            template,
            registry,
            config,
            row_count,
            current_row,
            virtualizer,
            sizing,
            scroll,
            ..
        } = self;
        let arena: &TemplateArena = arena;
        let registry: &UnitRegistry = registry;
        let tpl = &arena[*template];
        let flow = tpl.flow();
        let cross = flow.other();
        let block_count = geometry.block_count;
        let tolerance = config.tolerance;
        let cross_map = CrossMap::new(
            &sizing[cross.index()],
            tpl.repeat_span(cross),
            tpl.block_dimensions(),
        );
        let cx = RealizeContext {
            arena,
            template: tpl,
            repeating: registry.repeating(),
            row_count: *row_count,
            current_row: *current_row,
        };

        let mut changed = false;
        if virtualizer.window().last().is_some_and(|last| last >= block_count) {
            virtualizer.virtualize_from(block_count);
            changed = true;
        }
        if block_count == 0 {
            return changed;
        }

        let (head_inset, tail_inset) = insets[flow.index()];
        let offset = scroll.offset().get(flow);
        let view_start = offset + head_inset;
        let view_end = offset + scroll.viewport().get(flow) - tail_inset;
        let overscan = config.overscan;

        let (target, target_start) = {
            let mut layout = geometry.layout(virtualizer.lengths_mut());
            let visible = layout.block_at(view_start).unwrap_or(0);
            // With the end of the data in view there is nothing to look ahead
            // to, so the spare blocks go in front.
            let target = if layout.end(block_count - 1) <= view_end + tolerance {
                visible.saturating_sub(1 + overscan)
            } else {
                visible
            };
            (target, layout.start(target) - geometry.head)
        };

        let measure = |virtualizer: &mut Virtualizer, block: usize| {
            measure_block(arena, tpl, registry, &cross_map, virtualizer, block);
        };

        let len = virtualizer.window().len();
        match virtualizer.window().bounds() {
            Some((first, last)) if target <= last && target + len >= first => {
                if target > first {
                    virtualizer.virtualize_head(target - first);
                    changed = true;
                }
                if target < first {
                    changed |= trim_tail(virtualizer, &geometry, view_end, tolerance, overscan);
                    // Stop once the window reaches the view start and the target.
                    while let Some(first) = virtualizer.window().first().filter(|&first| first > 0) {
                        let start = geometry.layout(virtualizer.lengths_mut()).start(first);
                        let reached = start <= view_start + tolerance;
                        if reached && first <= target {
                            break;
                        }
                        virtualizer.realize_prev(&cx);
                        measure(virtualizer, first - 1);
                        changed = true;
                    }
                }
            }
            _ => {
                virtualizer.virtualize_all();
                virtualizer.realize_first(&cx, target);
                virtualizer.lengths_mut().set_anchor(target, target_start);
                measure(virtualizer, target);
                changed = true;
            }
        }

        // Grow until the realized blocks reach past the viewport end.
        while let Some(last) = virtualizer.window().last() {
            if last + 1 >= block_count
                || geometry.layout(virtualizer.lengths_mut()).end(last) > view_end + tolerance
            {
                break;
            }
            virtualizer.realize_next(&cx);
            measure(virtualizer, last + 1);
            changed = true;
        }
        while let Some(last) = virtualizer.window().last() {
            let wanted = wanted_last(virtualizer, &geometry, view_end, tolerance, overscan);
            if wanted.is_none_or(|wanted| last >= wanted) {
                break;
            }
            virtualizer.realize_next(&cx);
            measure(virtualizer, last + 1);
            changed = true;
        }
        changed |= trim_tail(virtualizer, &geometry, view_end, tolerance, overscan);
        changed |= reanchor(virtualizer, &geometry, scroll, flow, tolerance);
        changed
    }

    /// `(head, tail)` lengths of pinned tracks per axis.
    fn pinned_insets(&self) -> [(f64, f64); 2] {
        let mut insets = [(0.0, 0.0); 2];
        if self.sizing.iter().any(AxisSizing::is_empty) {
            return insets;
        }
        let tpl = &self.arena[self.template];
        let flow = tpl.flow();
        for axis in Axis::ALL {
            let pinned = tpl.pinned(axis);
            let count = tpl.tracks(axis).len();
            let map = if axis == flow {
                CrossMap::new(&self.sizing[axis.index()], None, 1)
            } else {
                CrossMap::new(&self.sizing[axis.index()], tpl.repeat_span(axis), tpl.block_dimensions())
            };
            let head = if pinned.head > 0 { map.start(pinned.head, 0) } else { 0.0 };
            let tail = if pinned.tail > 0 {
                map.extent() - map.start(count - pinned.tail, 0)
            } else {
                0.0
            };
            insets[axis.index()] = (head, tail);
        }
        insets
    }

    // ── Arrange ──────────────────────────────────────────────────────

    fn arrange_elements(&mut self) {
        let geometry = self.block_geometry();
        let Self {
            arena,
            template,
            registry,
            scalars,
            virtualizer,
            sizing,
            blocks_length,
            scroll,
            arranged,
            ..
        } = self;
        let arena: &TemplateArena = arena;
        let scroll: &ScrollState = scroll;
        let blocks_length = *blocks_length;
        arranged.clear();
        let tpl = &arena[*template];
        let flow = tpl.flow();
        let cross = flow.other();
        let dims = tpl.block_dimensions();
        let main_sizing = &sizing[flow.index()];
        let main_repeat = tpl.repeat_span(flow);
        let cross_map = CrossMap::new(&sizing[cross.index()], tpl.repeat_span(cross), dims);

        let static_start = |track: usize| {
            let after_blocks = main_repeat.is_some_and(|span| track > span.end);
            main_sizing.prefix(track) + if after_blocks { blocks_length } else { 0.0 }
        };
        let place = |range: &GridRange, main: (f64, f64), slots: (usize, usize)| {
            let main_span = range.span(flow);
            let cross_span = range.span(cross);
            let (cross_start, cross_len) = cross_map.span(cross_span, slots);
            Rect::from_spans(
                flow,
                (to_viewport(tpl, scroll, flow, main_span, main.0), main.1),
                (to_viewport(tpl, scroll, cross, cross_span, cross_start), cross_len),
            )
        };

        let arrange_scalar = |slot: &mut ScalarSlot, arranged: &mut Vec<ArrangedElement>| {
            let span = slot.range.span(flow);
            let start = static_start(span.start);
            let end = static_start(span.end) + main_sizing.length(span.end);
            let rect = place(&slot.range, (start, end - start), cross_map.all_slots());
            slot.instance.arrange(arena, rect);
            arranged.push(ArrangedElement {
                id: VisualId::Scalar(slot.unit),
                rect,
                pinned: slot.pinned,
            });
        };

        for slot in scalars.iter_mut().filter(|slot| slot.pinned) {
            arrange_scalar(slot, arranged);
        }

        // Block geometry is read up front; the tracker and the instances live
        // side by side in the virtualizer.
        let mut block_starts = Vec::new();
        let mut track_spans: Vec<Vec<(f64, f64)>> = Vec::new();
        if let Some(main_span) = main_repeat {
            let realized: Vec<usize> = virtualizer.window().iter().map(|(block, _)| block).collect();
            let mut layout = geometry.layout(virtualizer.lengths_mut());
            for block in realized {
                block_starts.push((block, layout.start(block)));
                track_spans.push(
                    main_span
                        .iter()
                        .map(|track| (layout.track_offset(block, track), layout.track_length(block, track)))
                        .collect(),
                );
            }
        }

        let items: Vec<VisualKey> = virtualizer.collection().items().to_vec();
        for key in items {
            match key {
                VisualKey::Scalar(id) => {
                    if let Some(slot) = scalars.iter_mut().find(|slot| slot.unit == id) {
                        arrange_scalar(slot, arranged);
                    }
                }
                VisualKey::Block(block) => {
                    let (Some(main_span), Some(index)) = (
                        main_repeat,
                        block_starts.iter().position(|&(b, _)| b == block),
                    ) else {
                        continue;
                    };
                    let start = block_starts[index].1;
                    let tracks = &track_spans[index];
                    let Some(instance) = virtualizer.window_mut().get_mut(block) else {
                        continue;
                    };
                    for &id in registry.repeating() {
                        let Some(unit) = tpl.unit(id) else { continue };
                        let range = unit.range();
                        let span = range.span(flow);
                        let (first_offset, _) = tracks[span.start - main_span.start];
                        let (last_offset, last_len) = tracks[span.end - main_span.start];
                        let main = (start + first_offset, last_offset + last_len - first_offset);
                        for (slot, element) in instance.instances_mut(id) {
                            let slots = slot.map_or(cross_map.all_slots(), |k| (k, k));
                            let rect = place(&range, main, slots);
                            element.arrange(arena, rect);
                            let visual = match slot {
                                Some(k) => VisualId::Row { row: block * dims + k, unit: id },
                                None => VisualId::Block { block, unit: id },
                            };
                            arranged.push(ArrangedElement { id: visual, rect, pinned: false });
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether a scalar unit lies wholly inside pinned tracks of some axis.
fn is_pinned(template: &Template, range: &GridRange) -> bool {
    Axis::ALL.into_iter().any(|axis| {
        let pinned = template.pinned(axis);
        let count = template.tracks(axis).len();
        let span = range.span(axis);
        (pinned.head > 0 && span.end < pinned.head)
            || (pinned.tail > 0 && span.start >= count.saturating_sub(pinned.tail))
    })
}

/// Map a content coordinate of a unit spanning `span` on `axis` to the viewport.
fn to_viewport(template: &Template, scroll: &ScrollState, axis: Axis, span: Span, content: f64) -> f64 {
    let pinned = template.pinned(axis);
    let count = template.tracks(axis).len();
    if pinned.head > 0 && span.end < pinned.head {
        content
    } else if pinned.tail > 0 && span.start >= count.saturating_sub(pinned.tail) {
        content - scroll.max_offset().get(axis)
    } else {
        content - scroll.offset().get(axis)
    }
}

/// Measure the repeating units of a realized block into its variant lengths.
fn measure_block(
    arena: &TemplateArena,
    template: &Template,
    registry: &UnitRegistry,
    cross_map: &CrossMap<'_>,
    virtualizer: &mut Virtualizer,
    block: usize,
) {
    let flow = template.flow();
    let cross = flow.other();
    let Some((instance, lengths)) = virtualizer.block_and_lengths_mut(block) else {
        return;
    };
    lengths.begin_block(block);
    for &id in registry.auto_size_order() {
        let Some(unit) = template.unit(id) else { continue };
        if unit.is_scalar() {
            continue;
        }
        let range = unit.range();
        let span = range.span(flow);
        if !lengths.has_variant(span) {
            continue;
        }
        for (slot, element) in instance.instances_mut(id) {
            let slots = slot.map_or(cross_map.all_slots(), |k| (k, k));
            let (_, across) = cross_map.span(range.span(cross), slots);
            let desired = element.measure(arena, Size::from_axis(flow, f64::INFINITY, across));
            lengths.apply_excess(template.tracks(flow), block, span, desired.get(flow));
        }
    }
    lengths.finish_block(block);
}

/// Last block the window should hold: the first one ending past `view_end`,
/// plus `overscan`.
fn wanted_last(
    virtualizer: &mut Virtualizer,
    geometry: &BlockGeometry,
    view_end: f64,
    tolerance: f64,
    overscan: usize,
) -> Option<usize> {
    let (first, last) = virtualizer.window().bounds()?;
    let mut layout = geometry.layout(virtualizer.lengths_mut());
    let needed = (first..=last)
        .find(|&block| layout.end(block) > view_end + tolerance)
        .unwrap_or(last);
    Some((needed + overscan).min(geometry.block_count.saturating_sub(1)))
}

/// Move the realized window back to a reachable place when its first block
/// sits where no block can: block 0 away from the origin, or a later block at
/// or before it. The offset moves by the same amount so the viewport keeps
/// showing the same content.
fn reanchor(
    virtualizer: &mut Virtualizer,
    geometry: &BlockGeometry,
    scroll: &mut ScrollState,
    flow: Axis,
    tolerance: f64,
) -> bool {
    let Some(first) = virtualizer.window().first() else {
        return false;
    };
    let layout = geometry.layout(virtualizer.lengths_mut());
    let Some(start) = layout.first_start() else {
        return false;
    };
    let wanted = if first == 0 {
        0.0
    } else {
        first as f64 * layout.estimate()
    };
    let misplaced = if first == 0 {
        start.abs() > tolerance
    } else {
        start <= tolerance && wanted > tolerance
    };
    if !misplaced {
        return false;
    }
    virtualizer.lengths_mut().set_first_start(wanted);

    let delta = wanted - start;
    let extent = scroll.extent();
    scroll.set_extent(Size::from_axis(flow, extent.get(flow) + delta, extent.get(flow.other())));
    let offset = scroll.offset().get(flow);
    scroll.set_offset(flow, offset + delta);
    tracing::debug!(first, from = start, to = wanted, "re-anchored realized window");
    true
}

/// Virtualize blocks past [`wanted_last`]. Returns whether any were dropped.
fn trim_tail(
    virtualizer: &mut Virtualizer,
    geometry: &BlockGeometry,
    view_end: f64,
    tolerance: f64,
    overscan: usize,
) -> bool {
    let Some(last) = virtualizer.window().last() else {
        return false;
    };
    match wanted_last(virtualizer, geometry, view_end, tolerance, overscan) {
        Some(wanted) if last > wanted => {
            virtualizer.virtualize_tail(last - wanted);
            true
        }
        _ => false,
    }
}

//! Scroll state: offsets clamped to the scrollable range of extent vs. viewport.

use crate::geometry::{Axis, Point, Rect, Size};

// ---------------------------------------------------------------------------
// ScrollState
// ---------------------------------------------------------------------------

/// Scroll position of a virtualized grid.
///
/// The offset is always clamped to `[0, max_offset]` where
/// `max_offset = max(0, extent - viewport)` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    offset: Point,
    extent: Size,
    viewport: Size,
}

impl ScrollState {
    /// Create a scroll state at offset zero.
    pub fn new(extent: Size, viewport: Size) -> Self {
        Self {
            offset: Point::ZERO,
            extent,
            viewport,
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn extent(&self) -> Size {
        self.extent
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Largest valid offset on each axis.
    pub fn max_offset(&self) -> Point {
        Point::new(self.max_along(Axis::Horizontal), self.max_along(Axis::Vertical))
    }

    fn max_along(&self, axis: Axis) -> f64 {
        let max = self.extent.get(axis) - self.viewport.get(axis);
        if max.is_finite() {
            max.max(0.0)
        } else {
            0.0
        }
    }

    /// Set the offset on `axis`, clamped. Returns whether it changed.
    pub fn set_offset(&mut self, axis: Axis, value: f64) -> bool {
        let value = if value.is_nan() { 0.0 } else { value };
        let clamped = value.clamp(0.0, self.max_along(axis));
        let changed = clamped != self.offset.get(axis);
        self.offset.set(axis, clamped);
        changed
    }

    /// Scroll to an absolute position, clamped. Returns whether anything changed.
    pub fn scroll_to(&mut self, x: f64, y: f64) -> bool {
        let horizontal = self.set_offset(Axis::Horizontal, x);
        let vertical = self.set_offset(Axis::Vertical, y);
        horizontal || vertical
    }

    /// Scroll by a relative delta, clamped.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> bool {
        self.scroll_to(self.offset.x + dx, self.offset.y + dy)
    }

    /// Whether the content overflows the viewport on `axis`.
    pub fn is_scrollable(&self, axis: Axis) -> bool {
        self.max_along(axis) > 0.0
    }

    /// The visible part of the content.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.viewport.width, self.viewport.height)
    }

    /// Update the extent and re-clamp. Returns whether the offset moved.
    pub fn set_extent(&mut self, extent: Size) -> bool {
        self.extent = extent;
        self.reclamp()
    }

    /// Update the viewport and re-clamp. Returns whether the offset moved.
    pub fn set_viewport(&mut self, viewport: Size) -> bool {
        self.viewport = viewport;
        self.reclamp()
    }

    fn reclamp(&mut self) -> bool {
        self.scroll_to(self.offset.x, self.offset.y)
    }

    /// Scroll the least amount that brings `rect` (content coordinates) into
    /// the visible range on each axis.
    ///
    /// `insets` per axis are `(head, tail)` lengths at the viewport edges that
    /// cover content (pinned tracks); the target must land between them. A
    /// target larger than the available range is aligned to its start.
    /// Returns whether the offset changed.
    pub fn make_visible(&mut self, rect: Rect, insets: [(f64, f64); 2]) -> bool {
        let mut changed = false;
        for axis in Axis::ALL {
            let (head, tail) = insets[axis.index()];
            let offset = self.offset.get(axis);
            let visible_start = offset + head;
            let visible_end = offset + self.viewport.get(axis) - tail;
            let start = rect.start(axis);
            let end = rect.end(axis);

            let target = if start < visible_start || end - start > visible_end - visible_start {
                start - head
            } else if end > visible_end {
                offset + (end - visible_end)
            } else {
                offset
            };
            changed |= self.set_offset(axis, target);
        }
        changed
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(Size::ZERO, Size::ZERO)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

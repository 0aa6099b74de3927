//! Content coordinates along the flow (main) and cross axes.
//!
//! Main axis: static tracks before the repeat range, then every block, then
//! static tracks after it. Realized blocks use their measured lengths and sit
//! at an anchor kept by the length tracker; blocks after the last realized one
//! use the estimated block length.
//!
//! Cross axis: a block lays its data rows side by side, so tracks of the
//! repeat range appear once per row slot and tracks after it shift by the
//! extra slots.

use crate::config::EstimatePolicy;
use crate::sizing::{AxisSizing, VariantLengthTracker};
use crate::track::Span;

// ---------------------------------------------------------------------------
// CrossMap
// ---------------------------------------------------------------------------

/// Cross-axis positions with block dimensions applied.
#[derive(Debug, Clone, Copy)]
pub struct CrossMap<'a> {
    sizing: &'a AxisSizing,
    repeat: Option<Span>,
    dims: usize,
    repeat_len: f64,
}

impl<'a> CrossMap<'a> {
    pub fn new(sizing: &'a AxisSizing, repeat: Option<Span>, dims: usize) -> Self {
        let repeat_len = repeat.map_or(0.0, |span| sizing.span_length(span));
        Self {
            sizing,
            repeat,
            dims: dims.max(1),
            repeat_len,
        }
    }

    /// Cross length of one row slot.
    pub fn repeat_len(&self) -> f64 {
        self.repeat_len
    }

    fn shift(&self, track: usize, slot: usize) -> f64 {
        match self.repeat {
            Some(span) if span.contains(track) => slot as f64 * self.repeat_len,
            Some(span) if track > span.end => (self.dims - 1) as f64 * self.repeat_len,
            _ => 0.0,
        }
    }

    /// Start of `track` when drawn for row slot `slot`.
    pub fn start(&self, track: usize, slot: usize) -> f64 {
        self.sizing.prefix(track) + self.shift(track, slot)
    }

    /// `(start, length)` of `span`, from its first track in slot `slots.0` to
    /// its last track in slot `slots.1`.
    pub fn span(&self, span: Span, slots: (usize, usize)) -> (f64, f64) {
        let start = self.start(span.start, slots.0);
        let end = self.start(span.end, slots.1) + self.sizing.length(span.end);
        (start, end - start)
    }

    /// `(first, last)` slot covered by a unit that spans every row of a block.
    pub fn all_slots(&self) -> (usize, usize) {
        (0, self.dims - 1)
    }

    /// Total cross length.
    pub fn extent(&self) -> f64 {
        self.sizing.total() + (self.dims - 1) as f64 * self.repeat_len
    }
}

// ---------------------------------------------------------------------------
// BlockLayout
// ---------------------------------------------------------------------------

/// Main-axis positions of blocks, realized or estimated.
///
/// Realized blocks start at the tracker's anchor. Blocks after the last
/// realized one use the estimate; blocks before the first share the space in
/// front of the anchor evenly.
#[derive(Debug)]
pub struct BlockLayout<'a> {
    tracker: &'a mut VariantLengthTracker,
    head: f64,
    block_count: usize,
    estimate: f64,
    /// `(first, last, start of first)` of the realized blocks.
    realized: Option<(usize, usize, f64)>,
}

impl<'a> BlockLayout<'a> {
    /// `head` is the main-axis length of the static tracks before the repeat
    /// range. A realized window without an anchor is placed where the
    /// estimate puts its first block.
    pub fn new(
        tracker: &'a mut VariantLengthTracker,
        head: f64,
        block_count: usize,
        policy: EstimatePolicy,
    ) -> Self {
        let estimate = tracker.estimated_block_length(policy);
        let realized = match (tracker.first_block(), tracker.last_block()) {
            (Some(first), Some(last)) => {
                let start = match tracker.first_start() {
                    Some(start) => start,
                    None => {
                        let start = first as f64 * estimate;
                        tracker.set_first_start(start);
                        start
                    }
                };
                Some((first, last, start))
            }
            _ => None,
        };
        Self {
            tracker,
            head,
            block_count,
            estimate,
            realized,
        }
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Start of the first realized block, relative to the first block.
    pub fn first_start(&self) -> Option<f64> {
        self.realized.map(|(_, _, start)| start)
    }

    /// Length of each unrealized block before the realized window.
    fn leading(&self, first: usize, start: f64) -> f64 {
        if first == 0 {
            self.estimate
        } else {
            start / first as f64
        }
    }

    pub fn start(&mut self, block: usize) -> f64 {
        match self.realized {
            Some((first, last, start)) if block >= first && block <= last => {
                self.head + start + self.tracker.block_start(block)
            }
            Some((_, last, start)) if block > last => {
                self.head
                    + start
                    + self.tracker.realized_length()
                    + (block - last - 1) as f64 * self.estimate
            }
            Some((first, _, start)) => self.head + block as f64 * self.leading(first, start),
            None => self.head + block as f64 * self.estimate,
        }
    }

    pub fn length(&mut self, block: usize) -> f64 {
        match self.realized {
            Some((first, last, _)) if block >= first && block <= last => {
                self.tracker.block_length(block)
            }
            Some((first, _, start)) if block < first => self.leading(first, start),
            _ => self.estimate,
        }
    }

    pub fn end(&mut self, block: usize) -> f64 {
        self.start(block) + self.length(block)
    }

    /// Offset of template track `track` from the start of `block`.
    pub fn track_offset(&mut self, block: usize, track: usize) -> f64 {
        self.tracker.track_offset(block, track)
    }

    /// Length of template track `track` within `block`.
    pub fn track_length(&mut self, block: usize, track: usize) -> f64 {
        self.tracker.length(block, track)
    }

    /// Combined length of all blocks.
    pub fn total(&mut self) -> f64 {
        match self.realized {
            Some((_, last, start)) => {
                let after = self.block_count.saturating_sub(last + 1);
                start + self.tracker.realized_length() + after as f64 * self.estimate
            }
            None => self.block_count as f64 * self.estimate,
        }
    }

    /// First block whose end lies strictly after `position`.
    pub fn block_at(&mut self, position: f64) -> Option<usize> {
        if self.block_count == 0 {
            return None;
        }
        let relative = position - self.head;
        let block = match self.realized {
            Some((first, last, start)) => {
                let realized_end = start + self.tracker.realized_length();
                if relative < start {
                    let leading = self.leading(first, start);
                    Self::whole_blocks(relative, leading).min(first.saturating_sub(1))
                } else if relative < realized_end {
                    let mut found = last;
                    for block in first..=last {
                        let end = start
                            + self.tracker.block_start(block)
                            + self.tracker.block_length(block);
                        if end > relative {
                            found = block;
                            break;
                        }
                    }
                    found
                } else {
                    last + 1 + Self::whole_blocks(relative - realized_end, self.estimate)
                }
            }
            None => Self::whole_blocks(relative, self.estimate),
        };
        Some(block.min(self.block_count - 1))
    }

    /// Whole blocks of `each` that fit in `length`.
    fn whole_blocks(length: f64, each: f64) -> usize {
        if length <= 0.0 || each <= 0.0 {
            0
        } else {
            (length / each).floor() as usize
        }
    }
}

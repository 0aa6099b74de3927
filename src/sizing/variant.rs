//! Variant-length tracking for realized blocks.
//!
//! Inside the repeat range, absolute flow-axis tracks have the same length in
//! every block. Content tracks ("variant" tracks) do not: each realized block
//! measures them for its own rows. [`VariantLengthTracker`] keeps one
//! [`VariantLengthState`] per realized block, aligned with the realized window,
//! and turns them into block lengths, in-block track offsets and block starts.
//!
//! Unrealized blocks are never measured; their length is estimated.

use std::collections::VecDeque;

use crate::config::EstimatePolicy;
use crate::template::Template;
use crate::track::{Span, TrackList};

/// Marks a cumulative entry that must be recomputed.
const DIRTY: f64 = f64::NAN;

// ---------------------------------------------------------------------------
// VariantLengthState
// ---------------------------------------------------------------------------

/// Measured lengths of the variant tracks of one block.
///
/// Lengths are stored alongside their running sums. A length change shifts
/// the sums after it; a reset marks the sums dirty and they are rebuilt on the
/// next read.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantLengthState {
    lengths: Vec<f64>,
    cumulative: Vec<f64>,
}

impl VariantLengthState {
    pub fn new(minimums: &[f64]) -> Self {
        Self {
            lengths: minimums.to_vec(),
            cumulative: vec![DIRTY; minimums.len()],
        }
    }

    /// Back to the minimum lengths.
    pub fn reset(&mut self, minimums: &[f64]) {
        self.lengths.clear();
        self.lengths.extend_from_slice(minimums);
        self.cumulative.clear();
        self.cumulative.resize(minimums.len(), DIRTY);
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    fn is_dirty(&self) -> bool {
        self.cumulative.first().is_some_and(|c| c.is_nan())
    }

    fn ensure(&mut self) {
        if !self.is_dirty() {
            return;
        }
        let mut running = 0.0;
        for (sum, length) in self.cumulative.iter_mut().zip(&self.lengths) {
            running += length;
            *sum = running;
        }
    }

    /// Length of variant track `index`, read back from the running sums.
    pub fn get(&mut self, index: usize) -> f64 {
        self.ensure();
        let before = if index == 0 { 0.0 } else { self.cumulative[index - 1] };
        self.cumulative[index] - before
    }

    pub fn set(&mut self, index: usize, length: f64) {
        let delta = length - self.lengths[index];
        if delta == 0.0 {
            return;
        }
        self.lengths[index] = length;
        if !self.is_dirty() {
            for sum in &mut self.cumulative[index..] {
                *sum += delta;
            }
        }
    }

    /// Sum of variant tracks before `index`.
    pub fn prefix(&mut self, index: usize) -> f64 {
        self.ensure();
        if index == 0 {
            0.0
        } else {
            self.cumulative[index - 1]
        }
    }

    pub fn total(&mut self) -> f64 {
        self.ensure();
        self.cumulative.last().copied().unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// VariantLengthTracker
// ---------------------------------------------------------------------------

/// Per-block lengths of the repeat range's flow-axis tracks.
#[derive(Debug, Clone)]
pub struct VariantLengthTracker {
    span: Option<Span>,
    /// Per repeat track: its index among variant tracks, if it is one.
    variant_index: Vec<Option<usize>>,
    /// Per repeat track: its fixed length (0 for variant tracks).
    fixed: Vec<f64>,
    minimums: Vec<f64>,
    states: VecDeque<VariantLengthState>,
    first: usize,
    /// Start of each realized block relative to the first; one extra entry
    /// for the end of the last. NaN entries are recomputed on read.
    starts: Vec<f64>,
    /// A realized block and its start relative to the first block's origin.
    /// Realized content is positioned from here, so measuring a block never
    /// moves the blocks already placed.
    anchor: Option<(usize, f64)>,
    last_measured: Option<f64>,
}

impl VariantLengthTracker {
    /// Classify the flow-axis tracks of `template`'s repeat range.
    pub fn new(template: &Template) -> Self {
        let flow = template.flow();
        let span = template.repeat_span(flow);
        let tracks = template.tracks(flow);
        let mut variant_index = Vec::new();
        let mut fixed = Vec::new();
        let mut minimums = Vec::new();

        for ordinal in span.into_iter().flat_map(Span::iter) {
            let track = &tracks[ordinal];
            match track.spec().fixed_length() {
                Some(length) => {
                    variant_index.push(None);
                    fixed.push(track.clamp(length));
                }
                None => {
                    variant_index.push(Some(minimums.len()));
                    fixed.push(0.0);
                    minimums.push(track.min());
                }
            }
        }

        Self {
            span,
            variant_index,
            fixed,
            minimums,
            states: VecDeque::new(),
            first: 0,
            starts: vec![0.0],
            anchor: None,
            last_measured: None,
        }
    }

    /// The repeat range's flow-axis span.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn variant_count(&self) -> usize {
        self.minimums.len()
    }

    /// Index among variant tracks of template track `track`.
    pub fn variant_index(&self, track: usize) -> Option<usize> {
        let span = self.span?;
        if !span.contains(track) {
            return None;
        }
        self.variant_index[track - span.start]
    }

    pub fn is_variant(&self, track: usize) -> bool {
        self.variant_index(track).is_some()
    }

    /// Whether any track of `span` is variant.
    pub fn has_variant(&self, span: Span) -> bool {
        span.iter().any(|t| self.is_variant(t))
    }

    /// Sum of absolute repeat tracks: the part of every block's length that
    /// never varies.
    pub fn fixed_total(&self) -> f64 {
        self.fixed.iter().sum()
    }

    /// Sum of `span` when none of its tracks is variant.
    pub fn fixed_span_sum(&self, span: Span) -> Option<f64> {
        let repeat = self.span?;
        span.iter()
            .map(|t| {
                if self.is_variant(t) {
                    None
                } else {
                    Some(if repeat.contains(t) { self.fixed[t - repeat.start] } else { 0.0 })
                }
            })
            .sum()
    }

    // -- Window alignment ---------------------------------------------------

    /// Number of tracked (realized) blocks.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first_block(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.first)
    }

    pub fn last_block(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.first + self.states.len() - 1)
    }

    pub fn contains(&self, block: usize) -> bool {
        block >= self.first && block < self.first + self.states.len()
    }

    /// Start tracking `block` as the only realized block.
    pub fn push_first(&mut self, block: usize) {
        debug_assert!(self.is_empty());
        self.first = block;
        self.states.push_back(VariantLengthState::new(&self.minimums));
        self.starts = vec![0.0, DIRTY];
        self.anchor = None;
    }

    /// Track the block before the first.
    pub fn push_front(&mut self) {
        debug_assert!(!self.is_empty() && self.first > 0);
        self.first -= 1;
        self.states.push_front(VariantLengthState::new(&self.minimums));
        self.starts.insert(0, 0.0);
        self.mark_dirty_from(1);
    }

    /// Track the block after the last.
    pub fn push_back(&mut self) {
        debug_assert!(!self.is_empty());
        self.states.push_back(VariantLengthState::new(&self.minimums));
        self.starts.push(DIRTY);
    }

    pub fn pop_front(&mut self) {
        if let Some((block, start)) = self.anchor {
            if block == self.first {
                self.anchor = if self.states.len() > 1 {
                    let length = self.block_length(block);
                    Some((block + 1, start + length))
                } else {
                    None
                };
            }
        }
        if self.states.pop_front().is_some() {
            self.first += 1;
            self.starts.remove(0);
            self.starts[0] = 0.0;
            self.mark_dirty_from(1);
        }
    }

    pub fn pop_back(&mut self) {
        if let Some((block, start)) = self.anchor {
            if Some(block) == self.last_block() {
                self.anchor = if self.states.len() > 1 {
                    let length = self.block_length(block - 1);
                    Some((block - 1, start - length))
                } else {
                    None
                };
            }
        }
        if self.states.pop_back().is_some() {
            self.starts.pop();
        }
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.starts = vec![0.0];
        self.anchor = None;
    }

    // -- Anchoring --------------------------------------------------------------

    /// Place realized `block` at `start`, measured from the start of block 0.
    pub fn set_anchor(&mut self, block: usize, start: f64) {
        if self.contains(block) {
            self.anchor = Some((block, start));
        }
    }

    /// Start of the first realized block, measured from the start of block 0.
    pub fn first_start(&mut self) -> Option<f64> {
        let (block, start) = self.anchor?;
        Some(start - self.block_start(block))
    }

    /// Place the first realized block at `start`.
    pub fn set_first_start(&mut self, start: f64) {
        if let Some(first) = self.first_block() {
            self.anchor = Some((first, start));
        }
    }

    // -- Measurement ----------------------------------------------------------

    /// Reset `block`'s variant tracks to their minimums before re-measuring.
    pub fn begin_block(&mut self, block: usize) {
        let Some(index) = self.index(block) else { return };
        self.states[index].reset(&self.minimums);
        self.mark_dirty_from(index + 1);
    }

    /// Grow the last variant track of `span` in `block` so the span fits
    /// `desired`.
    pub fn apply_excess(&mut self, tracks: &TrackList, block: usize, span: Span, desired: f64) {
        let (Some(index), Some(repeat)) = (self.index(block), self.span) else {
            return;
        };
        let Some(last) = span.iter().rev().find(|&t| self.is_variant(t)) else {
            return;
        };
        let mut others = 0.0;
        for track in span.iter().filter(|&t| t != last) {
            others += match self.variant_index(track) {
                Some(v) => self.states[index].get(v),
                None if repeat.contains(track) => self.fixed[track - repeat.start],
                None => 0.0,
            };
        }
        let Some(v) = self.variant_index(last) else { return };
        let needed = desired - others;
        if needed > self.states[index].get(v) {
            self.states[index].set(v, tracks[last].clamp(needed));
            self.mark_dirty_from(index + 1);
        }
    }

    /// Record the final length of a freshly measured block.
    pub fn finish_block(&mut self, block: usize) {
        if self.contains(block) {
            self.last_measured = Some(self.block_length(block));
        }
    }

    /// Length of template track `track` within `block`.
    pub fn length(&mut self, block: usize, track: usize) -> f64 {
        let Some(repeat) = self.span else { return 0.0 };
        if !repeat.contains(track) {
            return 0.0;
        }
        match (self.variant_index(track), self.index(block)) {
            (Some(v), Some(index)) => self.states[index].get(v),
            (Some(v), None) => self.minimums[v],
            (None, _) => self.fixed[track - repeat.start],
        }
    }

    /// Offset of template track `track` from the start of `block`.
    pub fn track_offset(&mut self, block: usize, track: usize) -> f64 {
        let Some(repeat) = self.span else { return 0.0 };
        let end = track.clamp(repeat.start, repeat.end + 1);
        let fixed: f64 = self.fixed[..end - repeat.start].iter().sum();
        let variant_before = self.variant_index[..end - repeat.start]
            .iter()
            .filter(|v| v.is_some())
            .count();
        let variant = match self.index(block) {
            Some(index) => self.states[index].prefix(variant_before),
            None => self.minimums[..variant_before].iter().sum(),
        };
        fixed + variant
    }

    /// Total length of `block`: fixed repeat tracks plus its variant tracks.
    pub fn block_length(&mut self, block: usize) -> f64 {
        let variant = match self.index(block) {
            Some(index) => self.states[index].total(),
            None => self.minimums.iter().sum(),
        };
        self.fixed_total() + variant
    }

    /// Start of realized `block` relative to the first realized block.
    pub fn block_start(&mut self, block: usize) -> f64 {
        match self.index(block) {
            Some(index) => self.start_at(index),
            None => 0.0,
        }
    }

    /// Combined length of all realized blocks.
    pub fn realized_length(&mut self) -> f64 {
        self.start_at(self.states.len())
    }

    /// Length assumed for blocks that are not realized.
    pub fn estimated_block_length(&mut self, policy: EstimatePolicy) -> f64 {
        let initial = self.fixed_total() + self.minimums.iter().sum::<f64>();
        match policy {
            EstimatePolicy::RealizedAverage if !self.is_empty() => {
                self.realized_length() / self.states.len() as f64
            }
            EstimatePolicy::RealizedAverage | EstimatePolicy::LastMeasured => {
                self.last_measured.unwrap_or(initial)
            }
        }
    }

    fn index(&self, block: usize) -> Option<usize> {
        self.contains(block).then(|| block - self.first)
    }

    fn mark_dirty_from(&mut self, index: usize) {
        for start in self.starts.iter_mut().skip(index.max(1)) {
            *start = DIRTY;
        }
    }

    fn start_at(&mut self, index: usize) -> f64 {
        if !self.starts[index].is_nan() {
            return self.starts[index];
        }
        let mut from = index;
        while self.starts[from].is_nan() {
            from -= 1;
        }
        let fixed = self.fixed_total();
        for i in from..index {
            let next = self.starts[i] + fixed + self.states[i].total();
            self.starts[i + 1] = next;
        }
        self.starts[index]
    }
}

//! Per-axis track lengths for one layout pass.
//!
//! [`AxisSizing`] holds the lengths the sizing algorithm produces for the tracks
//! of one axis, in three phases:
//!
//! 1. [`begin`](AxisSizing::begin): absolute tracks take their fixed length,
//!    content tracks start at their minimum.
//! 2. [`apply_excess`](AxisSizing::apply_excess) for every measured unit, then
//!    [`finish_content`](AxisSizing::finish_content).
//! 3. [`distribute`](AxisSizing::distribute): proportional tracks share what is
//!    left of the available length.
//!
//! Tracks of a deferred span (the repeat range on the flow axis) are skipped
//! here; their lengths vary per block and live in the variant tracker.

use crate::track::{GridTrack, Span, TrackList};

/// Resolution state of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackState {
    /// Length is final for this pass.
    Resolved,
    /// Content track still accumulating measured lengths.
    Content,
    /// Proportional track waiting for distribution.
    Pending,
    /// Sized elsewhere.
    Deferred,
}

/// Track lengths of one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSizing {
    lengths: Vec<f64>,
    states: Vec<TrackState>,
}

impl AxisSizing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new pass over `tracks`.
    ///
    /// With an infinite `available` length (size-to-content) proportional
    /// tracks behave like content tracks.
    pub fn begin(&mut self, tracks: &TrackList, available: f64, deferred: Option<Span>) {
        let size_to_content = !available.is_finite();
        self.lengths.clear();
        self.states.clear();
        for track in tracks.iter() {
            let (length, state) = if deferred.is_some_and(|span| span.contains(track.ordinal())) {
                (0.0, TrackState::Deferred)
            } else if let Some(fixed) = track.spec().fixed_length() {
                (track.clamp(fixed), TrackState::Resolved)
            } else if track.is_content() || size_to_content {
                (track.min(), TrackState::Content)
            } else {
                (track.min(), TrackState::Pending)
            };
            self.lengths.push(length);
            self.states.push(state);
        }
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Current length of a track.
    pub fn length(&self, track: usize) -> f64 {
        self.lengths[track]
    }

    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Whether the track still takes content measurements.
    pub fn is_content(&self, track: usize) -> bool {
        self.states[track] == TrackState::Content
    }

    /// Whether any track in `span` still takes content measurements.
    pub fn has_content(&self, span: Span) -> bool {
        span.iter().any(|t| self.is_content(t))
    }

    /// Sum of `span` if every track in it is resolved.
    pub fn known_sum(&self, span: Span) -> Option<f64> {
        span.iter()
            .map(|t| (self.states[t] == TrackState::Resolved).then(|| self.lengths[t]))
            .sum()
    }

    /// Grow the last content track of `span` so the span fits `desired`.
    ///
    /// Non-content tracks in the span count with their current length, earlier
    /// content tracks with what they have measured so far. The last content
    /// track absorbs the rest, clamped to its bounds, and never shrinks.
    pub fn apply_excess(&mut self, tracks: &TrackList, span: Span, desired: f64) {
        let Some(last) = span.iter().rev().find(|&t| self.is_content(t)) else {
            return;
        };
        let others: f64 = span
            .iter()
            .filter(|&t| t != last && self.states[t] != TrackState::Deferred)
            .map(|t| self.lengths[t])
            .sum();
        let needed = desired - others;
        if needed > self.lengths[last] {
            self.lengths[last] = tracks[last].clamp(needed);
        }
    }

    /// End of the content phase: content tracks keep their measured length.
    pub fn finish_content(&mut self) {
        for state in &mut self.states {
            if *state == TrackState::Content {
                *state = TrackState::Resolved;
            }
        }
    }

    /// Sum of every resolved track (absolute and content, after phase 2).
    pub fn resolved_total(&self) -> f64 {
        self.sum_where(|state| state == TrackState::Resolved)
    }

    /// Share `remaining` among pending proportional tracks by weight.
    pub fn distribute(&mut self, tracks: &TrackList, remaining: f64) {
        let pending: Vec<&GridTrack> = tracks
            .iter()
            .filter(|t| self.states[t.ordinal()] == TrackState::Pending)
            .collect();
        if pending.is_empty() {
            return;
        }
        let shares = distribute_proportional(&pending, remaining);
        for (track, share) in pending.iter().zip(shares) {
            self.lengths[track.ordinal()] = share;
            self.states[track.ordinal()] = TrackState::Resolved;
        }
    }

    /// Sum of all non-deferred tracks.
    pub fn total(&self) -> f64 {
        self.sum_where(|state| state != TrackState::Deferred)
    }

    /// Sum of non-deferred tracks before `track`.
    pub fn prefix(&self, track: usize) -> f64 {
        (0..track)
            .filter(|&t| self.states[t] != TrackState::Deferred)
            .map(|t| self.lengths[t])
            .sum()
    }

    /// Sum of non-deferred tracks in `span`.
    pub fn span_length(&self, span: Span) -> f64 {
        span.iter()
            .filter(|&t| self.states[t] != TrackState::Deferred)
            .map(|t| self.lengths[t])
            .sum()
    }

    fn sum_where(&self, keep: impl Fn(TrackState) -> bool) -> f64 {
        self.lengths
            .iter()
            .zip(&self.states)
            .filter(|(_, state)| keep(**state))
            .map(|(length, _)| length)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Proportional distribution
// ---------------------------------------------------------------------------

/// Split `remaining` among `tracks` in proportion to their weights.
///
/// A share that violates a track's bounds is clamped; that track drops out and
/// the others are re-normalized over what is left, until no share changes.
pub fn distribute_proportional(tracks: &[&GridTrack], remaining: f64) -> Vec<f64> {
    let mut shares = vec![0.0; tracks.len()];
    let mut open: Vec<usize> = (0..tracks.len()).collect();
    let mut remaining = remaining.max(0.0);

    while !open.is_empty() {
        let total_weight: f64 = open.iter().map(|&i| weight(tracks[i])).sum();
        let mut clamped = Vec::new();
        for &i in &open {
            let share = if total_weight > 0.0 {
                remaining * weight(tracks[i]) / total_weight
            } else {
                0.0
            };
            let bounded = tracks[i].clamp(share);
            shares[i] = bounded;
            if bounded != share {
                clamped.push(i);
            }
        }
        if clamped.is_empty() {
            break;
        }
        for i in clamped {
            remaining = (remaining - shares[i]).max(0.0);
            open.retain(|&j| j != i);
        }
    }
    shares
}

fn weight(track: &GridTrack) -> f64 {
    track.spec().weight().unwrap_or(1.0)
}

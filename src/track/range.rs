//! GridRange: a rectangular span of tracks inside one template.

use std::ops::RangeInclusive;

use crate::error::{GridError, Result};
use crate::geometry::Axis;
use crate::template::TemplateId;

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// An inclusive run of track ordinals on one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of tracks covered.
    #[inline]
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    #[inline]
    pub const fn contains(self, ordinal: usize) -> bool {
        ordinal >= self.start && ordinal <= self.end
    }

    #[inline]
    pub const fn contains_span(self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    #[inline]
    pub const fn overlaps(self, other: Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Iterate the ordinals in the span.
    #[inline]
    pub fn iter(self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

// ---------------------------------------------------------------------------
// GridRange
// ---------------------------------------------------------------------------

/// A rectangle of tracks `(left, top) ..= (right, bottom)` owned by one template.
///
/// Ranges are created through [`Template::range`](crate::template::Template::range)
/// and [`Template::range_span`](crate::template::Template::range_span), which
/// validate the ordinals. The empty range has no owner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridRange {
    owner: Option<TemplateId>,
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl GridRange {
    /// The unset range.
    pub const EMPTY: GridRange = GridRange {
        owner: None,
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Build a range whose ordinals the caller has already validated.
    pub(crate) fn new(owner: TemplateId, left: usize, top: usize, right: usize, bottom: usize) -> Self {
        debug_assert!(right >= left && bottom >= top);
        Self {
            owner: Some(owner),
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn owner(&self) -> Option<TemplateId> {
        self.owner
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    /// The covered tracks on `axis`.
    pub fn span(&self, axis: Axis) -> Span {
        match axis {
            Axis::Horizontal => Span::new(self.left, self.right),
            Axis::Vertical => Span::new(self.top, self.bottom),
        }
    }

    pub fn column_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.right - self.left + 1
        }
    }

    pub fn row_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.bottom - self.top + 1
        }
    }

    /// Whether `other` lies inside this range on both axes.
    ///
    /// Empty ranges and ranges of different templates are never contained.
    pub fn contains(&self, other: &GridRange) -> bool {
        !self.is_empty()
            && self.owner == other.owner
            && self.span(Axis::Horizontal).contains_span(other.span(Axis::Horizontal))
            && self.span(Axis::Vertical).contains_span(other.span(Axis::Vertical))
    }

    /// Whether the track `ordinal` on `axis` falls inside this range.
    pub fn contains_track(&self, axis: Axis, ordinal: usize) -> bool {
        !self.is_empty() && self.span(axis).contains(ordinal)
    }

    /// The minimal range enclosing both. Fails if they belong to different templates.
    pub fn union(&self, other: &GridRange) -> Result<GridRange> {
        if self.is_empty() {
            return Ok(*other);
        }
        if other.is_empty() {
            return Ok(*self);
        }
        if self.owner != other.owner {
            return Err(GridError::MismatchedTemplate);
        }
        Ok(GridRange {
            owner: self.owner,
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        })
    }
}

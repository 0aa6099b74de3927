//! Ordered track lists: the columns or rows of a template.

use crate::error::{GridError, Result};
use crate::geometry::Axis;

use super::length::TrackSpec;

/// A single column or row slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTrack {
    axis: Axis,
    ordinal: usize,
    spec: TrackSpec,
}

impl GridTrack {
    /// The axis this track sizes (columns are horizontal, rows vertical).
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Dense position of this track on its axis, `0..N`.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn spec(&self) -> &TrackSpec {
        &self.spec
    }

    pub fn min(&self) -> f64 {
        self.spec.min
    }

    pub fn max(&self) -> f64 {
        self.spec.max
    }

    pub fn is_absolute(&self) -> bool {
        self.spec.is_absolute()
    }

    pub fn is_proportional(&self) -> bool {
        self.spec.is_proportional()
    }

    pub fn is_content(&self) -> bool {
        self.spec.is_content()
    }

    /// Clamp a candidate length into the track's bounds.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        self.spec.clamp(value)
    }
}

/// The ordered tracks of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackList {
    axis: Axis,
    tracks: Vec<GridTrack>,
}

impl TrackList {
    /// Create an empty list for `axis`.
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            tracks: Vec::new(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Append a track and return its ordinal.
    pub fn add(&mut self, spec: TrackSpec) -> Result<usize> {
        spec.validate()?;
        let ordinal = self.tracks.len();
        self.tracks.push(GridTrack {
            axis: self.axis,
            ordinal,
            spec,
        });
        Ok(ordinal)
    }

    /// Fail with [`GridError::TrackOutOfRange`] unless `ordinal` is a valid track.
    pub fn check(&self, ordinal: usize) -> Result<()> {
        if ordinal < self.tracks.len() {
            Ok(())
        } else {
            Err(GridError::TrackOutOfRange {
                axis: self.axis,
                ordinal,
                count: self.tracks.len(),
            })
        }
    }

    pub fn get(&self, ordinal: usize) -> Option<&GridTrack> {
        self.tracks.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridTrack> {
        self.tracks.iter()
    }

    pub fn as_slice(&self) -> &[GridTrack] {
        &self.tracks
    }
}

impl std::ops::Index<usize> for TrackList {
    type Output = GridTrack;

    fn index(&self, ordinal: usize) -> &GridTrack {
        &self.tracks[ordinal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_dense_ordinals() {
        let mut rows = TrackList::new(Axis::Vertical);
        assert_eq!(rows.add(TrackSpec::absolute(20.0)).unwrap(), 0);
        assert_eq!(rows.add(TrackSpec::star(1.0)).unwrap(), 1);
        assert_eq!(rows.add(TrackSpec::auto()).unwrap(), 2);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].ordinal(), 2);
        assert_eq!(rows[2].axis(), Axis::Vertical);
        assert!(rows[2].is_content());
    }

    #[test]
    fn add_validates_spec() {
        let mut cols = TrackList::new(Axis::Horizontal);
        let err = cols.add(TrackSpec::auto().with_min(10.0).with_max(5.0)).unwrap_err();
        assert_eq!(err, GridError::UnsatisfiableBounds { min: 10.0, max: 5.0 });
        assert!(cols.is_empty());
    }

    #[test]
    fn check_reports_out_of_range() {
        let mut cols = TrackList::new(Axis::Horizontal);
        cols.add(TrackSpec::absolute(1.0)).unwrap();
        assert!(cols.check(0).is_ok());
        assert_eq!(
            cols.check(1).unwrap_err(),
            GridError::TrackOutOfRange { axis: Axis::Horizontal, ordinal: 1, count: 1 }
        );
    }

    #[test]
    fn track_clamp_uses_bounds() {
        let mut rows = TrackList::new(Axis::Vertical);
        rows.add(TrackSpec::auto().with_min(10.0).with_max(40.0)).unwrap();
        assert_eq!(rows[0].clamp(5.0), 10.0);
        assert_eq!(rows[0].clamp(25.0), 25.0);
        assert_eq!(rows[0].clamp(99.0), 40.0);
    }
}

//! Error type for template construction.
//!
//! Every structural mistake (bad length token, out-of-bounds track, ranges
//! from different templates, contradictory bounds) is reported at the point of
//! template construction. Layout passes themselves are infallible.

use crate::geometry::Axis;

/// Errors raised while authoring or sealing a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("invalid length `{input}`: {message}")]
    InvalidLength { input: String, message: String },
    #[error("{axis:?} track {ordinal} out of range (track count {count})")]
    TrackOutOfRange { axis: Axis, ordinal: usize, count: usize },
    #[error("invalid range: ({left}, {top}) .. ({right}, {bottom})")]
    InvalidRange { left: usize, top: usize, right: usize, bottom: usize },
    #[error("ranges belong to different templates")]
    MismatchedTemplate,
    #[error("unsatisfiable bounds: min {min}, max {max}")]
    UnsatisfiableBounds { min: f64, max: f64 },
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("template is sealed")]
    Sealed,
    #[error("template is not sealed")]
    NotSealed,
    #[error("unknown template")]
    UnknownTemplate,
}

/// Shorthand for results carrying a [`GridError`].
pub type Result<T, E = GridError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        let err = GridError::TrackOutOfRange { axis: Axis::Vertical, ordinal: 4, count: 3 };
        assert_eq!(err.to_string(), "Vertical track 4 out of range (track count 3)");

        let err = GridError::InvalidLength { input: "2**".into(), message: "unexpected `*`".into() };
        assert_eq!(err.to_string(), "invalid length `2**`: unexpected `*`");
    }
}

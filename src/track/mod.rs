//! Track model: length specifications, ordered track lists, grid ranges.

pub mod length;
pub mod model;
pub mod range;
pub mod tokenizer;

pub use length::{GridLength, TrackSpec};
pub use model::{GridTrack, TrackList};
pub use range::{GridRange, Span};

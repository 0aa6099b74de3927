//! Track sizing: per-axis lengths, static grid resolution, per-block variant lengths.

pub mod axis;
pub mod resolver;
pub mod variant;

pub use axis::{distribute_proportional, AxisSizing};
pub use resolver::{GridSizing, Occupant};
pub use variant::{VariantLengthState, VariantLengthTracker};

//! Scrolling: offsets, invalidation, and the coordinator that drives layout.

pub mod coordinator;
pub mod flow;
pub mod invalidation;
pub mod state;

pub use coordinator::{ArrangedElement, ScrollCoordinator, VisualId};
pub use flow::{BlockLayout, CrossMap};
pub use invalidation::{Invalidation, InvalidationReason};
pub use state::ScrollState;

//! Headless testing support: mock elements, a coordinator harness, and
//! snapshot helpers.
//!
//! Use [`Harness`] to build a template and drive a
//! [`ScrollCoordinator`](crate::scroll::ScrollCoordinator) without a host.
//! Use [`TrackedElement`] with an [`ElementLog`] to observe lifecycle calls
//! and [`layout_summary`] to capture arranged output as text.

pub mod elements;
pub mod harness;
pub mod snapshot;

pub use elements::{ElementLog, FixedElement, FnElement, LifecycleEvent, TrackedElement};
pub use harness::{tracked, Harness};
pub use snapshot::{arranged_to_string, layout_summary};

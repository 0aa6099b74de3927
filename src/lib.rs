//! # gilt-grid
//!
//! A virtualized grid layout and track-sizing engine.
//!
//! A [`Template`](template::Template) declares columns and rows (absolute,
//! proportional, or content-sized) and the units placed on them. Scalar units
//! render once; repeating units render once per data row or per block of rows.
//! A [`ScrollCoordinator`](scroll::ScrollCoordinator) sizes the tracks, keeps
//! only the blocks near the viewport realized, recycles block visuals through a
//! pool, and arranges every live element in viewport coordinates.
//!
//! ## Core Systems
//!
//! - **[`track`]**: length grammar, track lists, grid ranges
//! - **[`template`]**: templates, units, the unit registry, the template arena
//! - **[`element`]**: the element contract and unit instances (leaf or nested grid)
//! - **[`sizing`]**: the three-phase track-sizing algorithm and per-block lengths
//! - **[`virtualize`]**: realized window, recycle pool, block instances
//! - **[`scroll`]**: scroll state, invalidation, and the coordinator
//! - **[`config`]**: layout tuning knobs
//! - **[`data`]**: row-collection change notifications
//! - **[`geometry`]**: Axis, Point, Size, Rect
//! - **[`testing`]**: mock elements and a headless harness

// Foundation
pub mod error;
pub mod geometry;

// Template authoring
pub mod template;
pub mod track;

// Layout
pub mod element;
pub mod sizing;
pub mod virtualize;

// Host surface
pub mod config;
pub mod data;
pub mod scroll;

// Test support
pub mod testing;

pub use config::{EstimatePolicy, LayoutConfig};
pub use data::RowChange;
pub use element::{BindContext, Element, Generator};
pub use error::{GridError, Result};
pub use geometry::{Axis, Point, Rect, Size};
pub use scroll::{ArrangedElement, ScrollCoordinator, VisualId};
pub use template::{RepeatScope, Template, TemplateArena, TemplateId, UnitId};
pub use track::{GridRange, TrackSpec};

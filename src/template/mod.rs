//! Templates: tracks, units, repeat range, pinned edges, nested grids.

pub mod arena;
pub mod grid;
pub mod registry;
pub mod unit;

pub use arena::{TemplateArena, TemplateId};
pub use grid::{Pinned, Template};
pub use registry::UnitRegistry;
pub use unit::{Placement, RepeatScope, Unit, UnitId, UnitKind};

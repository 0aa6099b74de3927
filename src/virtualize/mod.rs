//! Virtualization: the realized window of blocks, its recycle pool, and the
//! scrollable element collection.

pub mod block;
pub mod collection;
pub mod pool;
pub mod virtualizer;
pub mod window;

pub use block::{BlockInstance, RowInstance};
pub use collection::{ElementCollection, VisualKey};
pub use pool::RecyclePool;
pub use virtualizer::{RealizeContext, VirtualizeStats, Virtualizer};
pub use window::RealizedWindow;

//! Elements: the host contract and the instances the engine builds from units.

pub mod instance;
pub mod traits;

pub use instance::{Instance, NestedGrid};
pub use traits::{BindContext, Element, Generator};

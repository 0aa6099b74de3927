//! Element trait: the host-provided visual behind every unit instance.
//!
//! The engine never inspects what an element is. It only drives the lifecycle
//! (`initialize` when bound to a row or block, `refresh` once per executed layout
//! pass, `cleanup` before the instance goes back to the recycle pool) and asks
//! for a desired size under a constraint.

use crate::geometry::{Rect, Size};

// ---------------------------------------------------------------------------
// BindContext
// ---------------------------------------------------------------------------

/// What an element instance is currently bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindContext {
    /// Data row ordinal, for row-scope instances.
    pub row: Option<usize>,
    /// Block ordinal, for row- and block-scope instances.
    pub block: Option<usize>,
    /// Whether `row` is the coordinator's current (edited) row.
    pub is_current: bool,
}

impl BindContext {
    /// Context for a scalar instance: bound to nothing.
    pub const SCALAR: BindContext = BindContext {
        row: None,
        block: None,
        is_current: false,
    };

    /// Context for a block-scope instance.
    pub fn block(block: usize) -> Self {
        Self {
            row: None,
            block: Some(block),
            is_current: false,
        }
    }

    /// Context for a row-scope instance.
    pub fn row(block: usize, row: usize, is_current: bool) -> Self {
        Self {
            row: Some(row),
            block: Some(block),
            is_current,
        }
    }
}

// ---------------------------------------------------------------------------
// Element trait
// ---------------------------------------------------------------------------

/// A visual instance produced for a unit.
///
/// Object-safe: the engine stores elements as `Box<dyn Element>`.
pub trait Element {
    /// Bind to a row/block. Called after creation and after being taken from the pool.
    fn initialize(&mut self, _ctx: &BindContext) {}

    /// Update from the bound data. Called once per executed layout pass.
    fn refresh(&mut self, _ctx: &BindContext) {}

    /// Release the binding before the instance is pooled.
    fn cleanup(&mut self, _ctx: &BindContext) {}

    /// Desired size under `constraint`. Either component may be infinite.
    fn measure(&mut self, constraint: Size) -> Size;

    /// Receive the final rectangle, in viewport coordinates.
    fn arrange(&mut self, _rect: Rect) {}
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Creates fresh element instances for a unit.
pub trait Generator {
    fn generate(&self) -> Box<dyn Element>;
}

// Blanket implementation: any element factory closure is a generator.
impl<F> Generator for F
where
    F: Fn() -> Box<dyn Element>,
{
    fn generate(&self) -> Box<dyn Element> {
        self()
    }
}

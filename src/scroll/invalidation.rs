//! Coalesced invalidation: one dirty flag and a pass counter.

/// Why a layout pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// A scroll offset changed.
    Offset,
    /// The available size changed.
    Viewport,
    /// Rows were inserted, removed, or reset.
    Rows,
    /// The current row moved.
    CurrentRow,
    /// Element content changed and must be re-measured.
    Content,
}

/// Dirty flag plus a generation that counts completed layout passes.
///
/// Any number of invalidations between two passes collapse into one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    dirty: bool,
    generation: u64,
    pending: Vec<InvalidationReason>,
}

impl Default for Invalidation {
    fn default() -> Self {
        Self {
            dirty: true,
            generation: 0,
            pending: Vec::new(),
        }
    }
}

impl Invalidation {
    /// A fresh, dirty state: nothing has been laid out yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self, reason: InvalidationReason) {
        if !self.pending.contains(&reason) {
            self.pending.push(reason);
        }
        if !self.dirty {
            tracing::trace!(?reason, generation = self.generation, "layout invalidated");
        }
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reasons recorded since the last completed pass.
    pub fn pending(&self) -> &[InvalidationReason] {
        &self.pending
    }

    /// Number of completed layout passes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark a pass complete.
    pub fn complete(&mut self) {
        self.dirty = false;
        self.pending.clear();
        self.generation += 1;
    }
}

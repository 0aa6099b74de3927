//! Virtualizer: realizes and virtualizes blocks at the edges of the window.
//!
//! Keeps four structures in step: the realized window of block instances, the
//! variant-length tracker (one state per realized block), the scrollable
//! element collection, and the recycle pool. A block instance is always in
//! exactly one of the window or the pool.

use crate::sizing::VariantLengthTracker;
use crate::template::{Template, TemplateArena, TemplateId, UnitId};

use super::block::BlockInstance;
use super::collection::ElementCollection;
use super::pool::RecyclePool;
use super::window::RealizedWindow;

/// What realizing a block needs to know about the grid and its data.
#[derive(Debug, Clone, Copy)]
pub struct RealizeContext<'a> {
    pub arena: &'a TemplateArena,
    pub template: &'a Template,
    pub repeating: &'a [UnitId],
    pub row_count: usize,
    pub current_row: Option<usize>,
}

impl RealizeContext<'_> {
    fn block_count(&self) -> usize {
        self.template.block_count(self.row_count)
    }
}

/// Counters for realize/virtualize activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualizeStats {
    /// Block instances built from scratch.
    pub created: usize,
    /// Block instances taken from the pool.
    pub reused: usize,
    /// Blocks realized.
    pub realized: usize,
    /// Blocks virtualized.
    pub virtualized: usize,
}

/// Realized window plus its recycle pool and per-block lengths.
#[derive(Debug)]
pub struct Virtualizer {
    template: TemplateId,
    window: RealizedWindow<BlockInstance>,
    pool: RecyclePool<TemplateId, BlockInstance>,
    lengths: VariantLengthTracker,
    collection: ElementCollection,
    stats: VirtualizeStats,
}

impl Virtualizer {
    pub fn new(template: &Template, collection: ElementCollection) -> Self {
        Self {
            template: template.id(),
            window: RealizedWindow::new(),
            pool: RecyclePool::new(),
            lengths: VariantLengthTracker::new(template),
            collection,
            stats: VirtualizeStats::default(),
        }
    }

    pub fn window(&self) -> &RealizedWindow<BlockInstance> {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut RealizedWindow<BlockInstance> {
        &mut self.window
    }

    pub fn lengths(&self) -> &VariantLengthTracker {
        &self.lengths
    }

    pub fn lengths_mut(&mut self) -> &mut VariantLengthTracker {
        &mut self.lengths
    }

    /// A realized block together with the length tracker, both mutable.
    pub fn block_and_lengths_mut(
        &mut self,
        block: usize,
    ) -> Option<(&mut BlockInstance, &mut VariantLengthTracker)> {
        let instance = self.window.get_mut(block)?;
        Some((instance, &mut self.lengths))
    }

    /// All realized blocks together with the length tracker.
    pub fn blocks_and_lengths_mut(
        &mut self,
    ) -> (
        impl Iterator<Item = (usize, &mut BlockInstance)> + '_,
        &mut VariantLengthTracker,
    ) {
        (self.window.iter_mut(), &mut self.lengths)
    }

    pub fn collection(&self) -> &ElementCollection {
        &self.collection
    }

    pub fn stats(&self) -> VirtualizeStats {
        self.stats
    }

    /// Number of block instances waiting in the pool.
    pub fn pooled(&self) -> usize {
        self.pool.len_of(self.template)
    }

    // -- Realize ------------------------------------------------------------

    /// Realize `block` into an empty window.
    ///
    /// # Panics
    ///
    /// Panics if the window is not empty or `block` does not exist.
    pub fn realize_first(&mut self, cx: &RealizeContext<'_>, block: usize) {
        assert!(self.window.is_empty(), "realize_first on a non-empty window");
        assert!(block < cx.block_count(), "block {block} out of range");
        let instance = self.acquire(cx, block);
        self.window.push_first(block, instance);
        self.lengths.push_first(block);
        self.collection.push_block_front(block);
        tracing::trace!(block, "realized first block");
    }

    /// Realize the block before the window.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty or starts at block 0.
    pub fn realize_prev(&mut self, cx: &RealizeContext<'_>) {
        let first = self.window.first().filter(|&first| first > 0);
        let Some(first) = first else {
            panic!("no block before the realized window");
        };
        let instance = self.acquire(cx, first - 1);
        self.window.push_front(instance);
        self.lengths.push_front();
        self.collection.push_block_front(first - 1);
        tracing::trace!(block = first - 1, "realized block at head");
    }

    /// Realize the block after the window.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty or ends at the last block.
    pub fn realize_next(&mut self, cx: &RealizeContext<'_>) {
        let next = self.window.last().map(|last| last + 1);
        let Some(next) = next.filter(|&next| next < cx.block_count()) else {
            panic!("no block after the realized window");
        };
        let instance = self.acquire(cx, next);
        self.window.push_back(instance);
        self.lengths.push_back();
        self.collection.push_block_back(next);
        tracing::trace!(block = next, "realized block at tail");
    }

    // -- Virtualize ---------------------------------------------------------

    /// Virtualize the first `n` realized blocks.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the window length.
    pub fn virtualize_head(&mut self, n: usize) {
        assert!(n <= self.window.len(), "cannot virtualize {n} of {} blocks", self.window.len());
        for _ in 0..n {
            if let Some((block, instance)) = self.window.pop_front() {
                self.lengths.pop_front();
                self.collection.pop_block_front();
                self.release(instance);
                tracing::trace!(block, "virtualized block at head");
            }
        }
    }

    /// Virtualize the last `n` realized blocks.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the window length.
    pub fn virtualize_tail(&mut self, n: usize) {
        assert!(n <= self.window.len(), "cannot virtualize {n} of {} blocks", self.window.len());
        for _ in 0..n {
            if let Some((block, instance)) = self.window.pop_back() {
                self.lengths.pop_back();
                self.collection.pop_block_back();
                self.release(instance);
                tracing::trace!(block, "virtualized block at tail");
            }
        }
    }

    pub fn virtualize_all(&mut self) {
        self.virtualize_head(self.window.len());
    }

    /// Virtualize every block from `block` to the end of the window.
    pub fn virtualize_from(&mut self, block: usize) {
        let Some((first, last)) = self.window.bounds() else { return };
        if block <= first {
            self.virtualize_all();
        } else if block <= last {
            self.virtualize_tail(last - block + 1);
        }
    }

    /// Virtualize everything and drop the pooled instances.
    pub fn clear(&mut self) {
        self.virtualize_all();
        self.pool.clear();
    }

    fn acquire(&mut self, cx: &RealizeContext<'_>, block: usize) -> BlockInstance {
        let mut instance = match self.pool.pop(self.template) {
            Some(instance) => {
                self.stats.reused += 1;
                instance
            }
            None => {
                self.stats.created += 1;
                BlockInstance::generate(cx.arena, cx.template, cx.repeating)
            }
        };
        let dims = cx.template.block_dimensions();
        let first_row = block * dims;
        let rows = dims.min(cx.row_count.saturating_sub(first_row));
        instance.bind(cx.arena, cx.template, block, first_row, rows, cx.current_row);
        self.stats.realized += 1;
        instance
    }

    fn release(&mut self, mut instance: BlockInstance) {
        instance.cleanup();
        self.stats.virtualized += 1;
        self.pool.push(self.template, instance);
    }
}

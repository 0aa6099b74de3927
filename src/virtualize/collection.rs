//! Visual collections: the order in which a coordinator's elements are listed.
//!
//! The scrollable collection lists leading scalars, then realized blocks in
//! ordinal order, then trailing scalars. Blocks are inserted and removed only
//! at the edges of the block run, mirroring the realized window.

use crate::template::UnitId;

/// An entry of a visual collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKey {
    Scalar(UnitId),
    Block(usize),
}

/// Ordered visual keys with a movable run of blocks in the middle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCollection {
    items: Vec<VisualKey>,
    blocks_start: usize,
    block_count: usize,
}

impl ElementCollection {
    pub fn new(
        leading: impl IntoIterator<Item = UnitId>,
        trailing: impl IntoIterator<Item = UnitId>,
    ) -> Self {
        let mut items: Vec<VisualKey> = leading.into_iter().map(VisualKey::Scalar).collect();
        let blocks_start = items.len();
        items.extend(trailing.into_iter().map(VisualKey::Scalar));
        Self {
            items,
            blocks_start,
            block_count: 0,
        }
    }

    /// Index of the first block entry (where the first realized block goes).
    pub fn blocks_start(&self) -> usize {
        self.blocks_start
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    pub fn items(&self) -> &[VisualKey] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Block ordinals currently listed, in order.
    pub fn blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.items[self.blocks_start..self.blocks_start + self.block_count]
            .iter()
            .filter_map(|key| match key {
                VisualKey::Block(ordinal) => Some(*ordinal),
                VisualKey::Scalar(_) => None,
            })
    }

    pub fn push_block_front(&mut self, ordinal: usize) {
        self.items.insert(self.blocks_start, VisualKey::Block(ordinal));
        self.block_count += 1;
    }

    pub fn push_block_back(&mut self, ordinal: usize) {
        self.items
            .insert(self.blocks_start + self.block_count, VisualKey::Block(ordinal));
        self.block_count += 1;
    }

    pub fn pop_block_front(&mut self) -> Option<usize> {
        if self.block_count == 0 {
            return None;
        }
        self.block_count -= 1;
        match self.items.remove(self.blocks_start) {
            VisualKey::Block(ordinal) => Some(ordinal),
            VisualKey::Scalar(_) => None,
        }
    }

    pub fn pop_block_back(&mut self) -> Option<usize> {
        if self.block_count == 0 {
            return None;
        }
        self.block_count -= 1;
        match self.items.remove(self.blocks_start + self.block_count) {
            VisualKey::Block(ordinal) => Some(ordinal),
            VisualKey::Scalar(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn blocks_stay_between_leading_and_trailing_scalars() {
        let mut ids: SlotMap<UnitId, ()> = SlotMap::with_key();
        let (header, footer) = (ids.insert(()), ids.insert(()));
        let mut collection = ElementCollection::new([header], [footer]);
        assert_eq!(collection.blocks_start(), 1);

        collection.push_block_back(4);
        collection.push_block_back(5);
        collection.push_block_front(3);
        assert_eq!(
            collection.items(),
            &[
                VisualKey::Scalar(header),
                VisualKey::Block(3),
                VisualKey::Block(4),
                VisualKey::Block(5),
                VisualKey::Scalar(footer),
            ]
        );
        assert_eq!(collection.blocks().collect::<Vec<_>>(), vec![3, 4, 5]);

        assert_eq!(collection.pop_block_front(), Some(3));
        assert_eq!(collection.pop_block_back(), Some(5));
        assert_eq!(collection.pop_block_back(), Some(4));
        assert_eq!(collection.pop_block_back(), None);
        assert_eq!(collection.len(), 2);
    }
}

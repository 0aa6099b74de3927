//! Realized window: a contiguous run of ordinals, each owning one entry.

use std::collections::VecDeque;

/// Entries for the ordinals `first ..= first + len - 1`.
///
/// Only the edges change: entries are added or removed at the front or back,
/// so the realized ordinals are contiguous by construction.
#[derive(Debug)]
pub struct RealizedWindow<T> {
    first: usize,
    entries: VecDeque<T>,
}

impl<T> Default for RealizedWindow<T> {
    fn default() -> Self {
        Self {
            first: 0,
            entries: VecDeque::new(),
        }
    }
}

impl<T> RealizedWindow<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.first)
    }

    pub fn last(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.first + self.entries.len() - 1)
    }

    /// `(first, last)` of a non-empty window.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        Some((self.first()?, self.last()?))
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        ordinal >= self.first && ordinal - self.first < self.entries.len()
    }

    pub fn get(&self, ordinal: usize) -> Option<&T> {
        if self.contains(ordinal) {
            self.entries.get(ordinal - self.first)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut T> {
        if self.contains(ordinal) {
            self.entries.get_mut(ordinal - self.first)
        } else {
            None
        }
    }

    /// `(ordinal, entry)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        let first = self.first;
        self.entries.iter().enumerate().map(move |(i, e)| (first + i, e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        let first = self.first;
        self.entries.iter_mut().enumerate().map(move |(i, e)| (first + i, e))
    }

    /// Start an empty window at `ordinal`.
    ///
    /// # Panics
    ///
    /// Panics if the window is not empty.
    pub fn push_first(&mut self, ordinal: usize, entry: T) {
        assert!(self.is_empty(), "window already has realized entries");
        self.first = ordinal;
        self.entries.push_back(entry);
    }

    /// Add the entry for `first - 1`.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty or already starts at ordinal 0.
    pub fn push_front(&mut self, entry: T) {
        assert!(!self.is_empty() && self.first > 0, "no ordinal before the window");
        self.first -= 1;
        self.entries.push_front(entry);
    }

    /// Add the entry for `last + 1`.
    ///
    /// # Panics
    ///
    /// Panics if the window is empty.
    pub fn push_back(&mut self, entry: T) {
        assert!(!self.is_empty(), "window is empty");
        self.entries.push_back(entry);
    }

    pub fn pop_front(&mut self) -> Option<(usize, T)> {
        let entry = self.entries.pop_front()?;
        let ordinal = self.first;
        self.first += 1;
        Some((ordinal, entry))
    }

    pub fn pop_back(&mut self) -> Option<(usize, T)> {
        let ordinal = self.last()?;
        self.entries.pop_back().map(|entry| (ordinal, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous<T>(window: &RealizedWindow<T>) {
        if let Some((first, last)) = window.bounds() {
            assert_eq!(last - first + 1, window.len());
            let ordinals: Vec<usize> = window.iter().map(|(o, _)| o).collect();
            assert_eq!(ordinals, (first..=last).collect::<Vec<_>>());
        }
    }

    #[test]
    fn grows_and_shrinks_at_both_edges() {
        let mut window = RealizedWindow::new();
        window.push_first(5, 'f');
        window.push_front('e');
        window.push_back('g');
        assert_eq!(window.bounds(), Some((4, 6)));
        assert_eq!(window.get(5), Some(&'f'));
        assert_eq!(window.get(7), None);
        assert_contiguous(&window);

        assert_eq!(window.pop_front(), Some((4, 'e')));
        assert_eq!(window.pop_back(), Some((6, 'g')));
        assert_eq!(window.bounds(), Some((5, 5)));
        assert_eq!(window.pop_back(), Some((5, 'f')));
        assert!(window.is_empty());
        assert_eq!(window.pop_front(), None);
    }

    #[test]
    #[should_panic(expected = "no ordinal before the window")]
    fn cannot_grow_before_zero() {
        let mut window = RealizedWindow::new();
        window.push_first(0, ());
        window.push_front(());
    }

    #[test]
    #[should_panic(expected = "already has realized entries")]
    fn push_first_requires_empty() {
        let mut window = RealizedWindow::new();
        window.push_first(0, ());
        window.push_first(3, ());
    }
}

//! Recycle pool: detached instances waiting to be reused.

use slotmap::{Key, SecondaryMap};

/// LIFO stacks of released values, one stack per slotmap key.
///
/// The most recently released value for a key is the next one handed out.
#[derive(Debug)]
pub struct RecyclePool<K: Key, V> {
    stacks: SecondaryMap<K, Vec<V>>,
}

impl<K: Key, V> Default for RecyclePool<K, V> {
    fn default() -> Self {
        Self {
            stacks: SecondaryMap::new(),
        }
    }
}

impl<K: Key, V> RecyclePool<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release `value` under `key`. Values released under a removed key are
    /// dropped.
    pub fn push(&mut self, key: K, value: V) {
        match self.stacks.get_mut(key) {
            Some(stack) => stack.push(value),
            None => {
                self.stacks.insert(key, vec![value]);
            }
        }
    }

    /// Take the most recently released value for `key`.
    pub fn pop(&mut self, key: K) -> Option<V> {
        self.stacks.get_mut(key)?.pop()
    }

    /// Number of pooled values for `key`.
    pub fn len_of(&self, key: K) -> usize {
        self.stacks.get(key).map_or(0, Vec::len)
    }

    /// Number of pooled values across all keys.
    pub fn len(&self) -> usize {
        self.stacks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.values().all(Vec::is_empty)
    }

    /// Drop every pooled value.
    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}

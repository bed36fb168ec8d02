//! Recency-ordered index of cached builds.
//!
//! Holds at most a handful of entries, so recency is tracked with a plain
//! `VecDeque` (front = least recently used) alongside the key map.

use std::collections::{HashMap, VecDeque};

use crate::coord::TileKey;

/// Key → value map that remembers access order.
///
/// Not synchronised; the owning cache guards it with a single mutex.
#[derive(Debug)]
pub(crate) struct LruIndex<V> {
    entries: HashMap<TileKey, V>,
    order: VecDeque<TileKey>,
}

impl<V: Clone> LruIndex<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns the entry for `key` and marks it most recently used.
    pub(crate) fn get(&mut self, key: &TileKey) -> Option<V> {
        let value = self.entries.get(key)?.clone();
        self.touch(key);
        Some(value)
    }

    /// Inserts an entry as most recently used.
    pub(crate) fn insert(&mut self, key: TileKey, value: V) {
        if self.entries.insert(key, value).is_some() {
            self.touch(&key);
        } else {
            self.order.push_back(key);
        }
    }

    /// Removes least recently used entries until at most `capacity` remain.
    ///
    /// Returns the evicted keys, oldest first.
    pub(crate) fn evict_over(&mut self, capacity: usize) -> Vec<TileKey> {
        let mut evicted = Vec::new();
        while self.order.len() > capacity {
            let Some(key) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&key);
            evicted.push(key);
        }
        evicted
    }

    pub(crate) fn contains(&self, key: &TileKey) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Keys from least to most recently used.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.order.iter()
    }

    fn touch(&mut self, key: &TileKey) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            self.order.remove(position);
        }
        self.order.push_back(*key);
    }
}

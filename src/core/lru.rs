//! Bounded least-recently-used memo table.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Default capacity used by the TER edit-distance memo.
pub const DEFAULT_CAPACITY: usize = 8192;

/// A bounded LRU map. Owned by a single task; not shared across threads.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    /// Creates a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.tick += 1;
        let tick = self.tick;
        let (value, last_used) = self.entries.get_mut(key)?;
        self.order.remove(&*last_used);
        *last_used = tick;
        self.order.insert(tick, key.clone());
        Some(value.clone())
    }

    /// Inserts `key`, evicting the least recently used entry when full.
    pub fn put(&mut self, key: K, value: V) {
        self.tick += 1;
        if let Some((_, last_used)) = self.entries.remove(&key) {
            self.order.remove(&last_used);
        } else if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
            }
        }
        self.order.insert(self.tick, key.clone());
        self.entries.insert(key, (value, self.tick));
    }

    /// Returns the cached value or computes, stores and returns it.
    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> V {
        if let Some(v) = self.get(&key) {
            return v;
        }
        let value = f();
        self.put(key, value.clone());
        value
    }
}

//! Pluggable key/record storage behind the challenge and refresh stores
//!
//! The in-memory backend keeps state in process memory. A deployment spanning
//! several instances supplies its own [`SessionBackend`] over a shared cache;
//! each method must be atomic with respect to the others.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Atomic keyed record storage
pub trait SessionBackend<V>: Send + Sync {
    /// Insert or replace the record under `key`
    fn put(&self, key: String, value: V);

    /// Copy of the record under `key`
    fn get(&self, key: &str) -> Option<V>;

    /// Remove and return the record under `key`
    fn take(&self, key: &str) -> Option<V>;

    /// Remove and return the record under `key` only if `matches` accepts it
    fn take_if(&self, key: &str, matches: &dyn Fn(&V) -> bool) -> Option<V>;

    /// Drop every record `keep` rejects, returning how many were dropped
    fn retain(&self, keep: &dyn Fn(&V) -> bool) -> usize;

    /// Number of stored records
    fn len(&self) -> usize;

    /// Whether the backend holds no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local backend guarded by a read/write lock
#[derive(Debug)]
pub struct MemoryBackend<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryBackend<V> {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for MemoryBackend<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> SessionBackend<V> for MemoryBackend<V> {
    fn put(&self, key: String, value: V) {
        self.entries.write().insert(key, value);
    }

    fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    fn take(&self, key: &str) -> Option<V> {
        self.entries.write().remove(key)
    }

    fn take_if(&self, key: &str, matches: &dyn Fn(&V) -> bool) -> Option<V> {
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|v| matches(v)) {
            entries.remove(key)
        } else {
            None
        }
    }

    fn retain(&self, keep: &dyn Fn(&V) -> bool) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, v| keep(v));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

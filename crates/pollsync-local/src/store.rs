use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use pollsync_core::Store;

/// In-memory `Store` backed by a sharded concurrent map.
///
/// Each `update`/`delete` locks only the shard owning the identifier, so a
/// reader never sees a half-written entry. Listing operations visit shards one
/// at a time and are not a point-in-time view across concurrent writers.
#[derive(Debug)]
pub struct MemoryStore<T> {
    /// Entries: id -> object
    entries: DashMap<String, T>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

impl<T: Clone> MemoryStore<T> {
    /// Clone of the object stored under `id`.
    pub fn get(&self, id: &str) -> Option<T> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Owned copy of every entry.
    pub fn snapshot(&self) -> HashMap<String, T> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl<T, I> FromIterator<(I, T)> for MemoryStore<T>
where
    I: Into<String>,
{
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        Self {
            entries: iter.into_iter().map(|(id, obj)| (id.into(), obj)).collect(),
        }
    }
}

impl<T: Send + Sync> Store<T> for MemoryStore<T> {
    fn contains(&self) -> HashSet<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    fn update(&self, id: String, object: T) {
        self.entries.insert(id, object);
    }

    fn delete(&self, id: &str) {
        self.entries.remove(id);
    }
}

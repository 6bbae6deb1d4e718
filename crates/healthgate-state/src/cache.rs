//! In-memory named caches.
//!
//! A [`CacheManager`] hands out [`Cache`]s by name, creating them on first
//! use. Entries live in a concurrent map, so a value written by one task is
//! visible to every later reader without any external locking.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

/// A single named cache of string entries.
#[derive(Debug)]
pub struct Cache {
    name: String,
    entries: DashMap<String, String>,
}

impl Cache {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cloned value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Insert or replace the value for `key`.
    pub fn put(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        debug!(cache = %self.name, %key, "cache entry written");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry of named caches, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct CacheManager {
    caches: Arc<DashMap<String, Arc<Cache>>>,
}

impl CacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache called `name`, created empty if it does not exist yet.
    pub fn cache(&self, name: &str) -> Arc<Cache> {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Cache::new(name)))
            .value()
            .clone()
    }

    /// Cache called `name` without creating it.
    pub fn get_cache(&self, name: &str) -> Option<Arc<Cache>> {
        self.caches.get(name).map(|entry| entry.value().clone())
    }
}

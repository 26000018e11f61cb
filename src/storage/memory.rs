// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::traits::{IterateOptions, OrderedStorage, StorageError, SubStore};

/// In-memory ordered storage backend.
///
/// Each sub-store is a `BTreeMap` so iteration order is the lexicographic
/// key order the cache's generated keys rely on. Used by the test suites and
/// as the reference implementation of [`OrderedStorage`].
pub struct MemoryStorage {
    subs: RwLock<HashMap<String, Arc<MemorySubStore>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedStorage for MemoryStorage {
    fn sub(&self, name: &str) -> Arc<dyn SubStore> {
        let mut subs = self.subs.write();
        let sub = subs
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemorySubStore::new()));
        Arc::clone(sub) as Arc<dyn SubStore>
    }
}

/// One named key space inside [`MemoryStorage`].
pub struct MemorySubStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySubStore {
    fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Current entry count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl SubStore for MemorySubStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn iterate(&self, opts: IterateOptions) -> Result<Vec<(String, String)>, StorageError> {
        let entries = self.entries.read();
        let snapshot: Vec<(String, String)> = if opts.reverse {
            entries
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        } else {
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let storage = MemoryStorage::new();
        let sub = storage.sub("keys");

        sub.put("a", "1").await.unwrap();

        let value = sub.get("a").await.unwrap();
        assert_eq!(value.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let storage = MemoryStorage::new();
        let sub = storage.sub("keys");

        assert!(sub.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_del() {
        let storage = MemoryStorage::new();
        let sub = storage.sub("keys");

        sub.put("a", "1").await.unwrap();
        sub.del("a").await.unwrap();

        assert!(sub.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_del_nonexistent_is_ok() {
        let storage = MemoryStorage::new();
        let sub = storage.sub("keys");

        assert!(sub.del("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_sub_stores_are_independent() {
        let storage = MemoryStorage::new();
        let keys = storage.sub("keys");
        let full = storage.sub("full");

        keys.put("a", "from-keys").await.unwrap();
        full.put("a", "from-full").await.unwrap();

        assert_eq!(keys.get("a").await.unwrap().as_deref(), Some("from-keys"));
        assert_eq!(full.get("a").await.unwrap().as_deref(), Some("from-full"));
    }

    #[tokio::test]
    async fn test_same_name_resolves_to_same_space() {
        let storage = MemoryStorage::new();

        storage.sub("conf").put("k", "v").await.unwrap();

        let again = storage.sub("conf");
        assert_eq!(again.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_iterate_ascending() {
        let storage = MemoryStorage::new();
        let sub = storage.sub("keys");

        sub.put("b", "2").await.unwrap();
        sub.put("a", "1").await.unwrap();
        sub.put("c", "3").await.unwrap();

        let entries = sub.iterate(IterateOptions::default()).await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_iterate_reverse() {
        let storage = MemoryStorage::new();
        let sub = storage.sub("keys");

        sub.put("a", "1").await.unwrap();
        sub.put("b", "2").await.unwrap();

        let entries = sub.iterate(IterateOptions { reverse: true }).await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let storage = Arc::new(MemoryStorage::new());
        let mut handles = vec![];

        for batch in 0..10 {
            let sub = storage.sub("keys");
            let handle = tokio::spawn(async move {
                for i in 0..10 {
                    sub.put(&format!("batch-{batch}-item-{i}"), "x").await.unwrap();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let entries = storage.sub("keys").iterate(IterateOptions::default()).await.unwrap();
        assert_eq!(entries.len(), 100);
    }
}

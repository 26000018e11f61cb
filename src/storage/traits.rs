// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Key not found")]
    NotFound,
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Options for ordered iteration over a sub-store.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterateOptions {
    /// Yield entries in descending key order instead of ascending.
    pub reverse: bool,
}

/// One namespaced, independently ordered key-value space.
///
/// Keys and values are opaque strings from the backend's perspective; the
/// cache layers its own structure on top (generated-key format, JSON index
/// entries).
#[async_trait]
pub trait SubStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn del(&self, key: &str) -> Result<(), StorageError>;

    /// All entries in key order (ascending unless `opts.reverse`).
    ///
    /// Returns a snapshot rather than a streaming cursor; callers that stop
    /// early (the prune loop) drop the tail.
    async fn iterate(&self, opts: IterateOptions) -> Result<Vec<(String, String)>, StorageError>;
}

/// An ordered storage backend that hands out namespaced sub-stores.
///
/// Each cache instance obtains independent sub-stores by name (`conf`,
/// `keys`, `full`, `data`, `frequency`). Repeated calls with the same name
/// must resolve to the same underlying space for the lifetime of the backend.
pub trait OrderedStorage: Send + Sync {
    fn sub(&self, name: &str) -> Arc<dyn SubStore>;
}

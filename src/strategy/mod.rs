// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Eviction strategies.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Strategy Module                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  size_based.rs  - Shared size accounting + the LRU policy    │
//! │  └─ SizeBasedStrategy: re-keying on access, oldest-first     │
//! │     prune over the ordered index                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  lfu.rs         - Least Frequently Used policy               │
//! │  └─ LfuStrategy: size-based accounting + frequency counts,   │
//! │     lowest-count-first prune                                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  registry.rs    - Name → constructor map, "LRU"/"LFU" built  │
//! │                   in, custom policies registrable            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every strategy is bound to one storage handle and one set of options at
//! construction (via [`StrategyContext`]) and implements the
//! [`EvictionStrategy`] capability contract. LRU is simply the size-based
//! core with no extra index; LFU composes the same core with a frequency
//! sub-store.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::CacheOptions;
use crate::events::PruneNotifier;
use crate::storage::{OrderedStorage, StorageError};

pub mod lfu;
pub mod registry;
pub mod size_based;

pub use lfu::LfuStrategy;
pub use registry::{StrategyConstructor, StrategyRegistry};
pub use size_based::SizeBasedStrategy;

#[derive(Error, Debug)]
pub enum CacheError {
    /// The configured policy could not be resolved. Raised at construction,
    /// before any storage access.
    #[error("Unknown eviction strategy: {0}")]
    UnknownStrategy(String),

    /// A capability the active strategy does not provide. Concrete built-in
    /// strategies implement the full contract; custom strategies may return
    /// this from operations they leave out.
    #[error("The {0}() method has not been implemented")]
    NotImplemented(&'static str),

    /// Storage adapter failure, propagated unchanged. No implicit retry;
    /// partial-write recovery is the storage collaborator's concern.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Value or index-entry (de)serialization failure.
    #[error("Serialization error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// What a cache hit yields: the stored value when the cache was configured
/// with `store_values`, otherwise the entry's (refreshed) generated key.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheHit {
    Value(Value),
    GeneratedKey(String),
}

impl CacheHit {
    /// The stored value, if this hit carries one.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::GeneratedKey(_) => None,
        }
    }

    /// The generated key, if this hit carries one.
    #[must_use]
    pub fn generated_key(&self) -> Option<&str> {
        match self {
            Self::Value(_) => None,
            Self::GeneratedKey(key) => Some(key),
        }
    }
}

/// Everything a strategy is bound to at construction.
#[derive(Clone)]
pub struct StrategyContext {
    pub storage: Arc<dyn OrderedStorage>,
    pub options: CacheOptions,
    pub notifier: PruneNotifier,
}

/// The eviction strategy capability contract.
///
/// One logical operation fans out into several sub-store operations; the
/// [`Cache`](crate::Cache) facade serializes calls per instance, so
/// implementations may assume no two operations interleave.
#[async_trait]
pub trait EvictionStrategy: Send + Sync {
    /// Insert or replace the entry for `key`. Adds the entry's size to the
    /// running total and prunes first when the total reaches the threshold.
    /// Returns the generated key assigned to the entry.
    async fn put(&self, key: &str, value: &Value) -> Result<String, CacheError>;

    /// Look up `key`, refreshing its position per the policy on a hit.
    /// `None` on a miss, with nothing mutated.
    async fn get(&self, key: &str) -> Result<Option<CacheHit>, CacheError>;

    /// Remove every record for `key`. Returns the removed generated key, or
    /// `None` if the key was not live.
    async fn del(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Evict entries in policy order until the total size is at or below the
    /// threshold. Publishes the evicted logical keys once (empty prunes are
    /// not published) and also returns them.
    async fn prune(&self) -> Result<Vec<String>, CacheError>;

    /// Running total of live entry sizes in bytes.
    async fn total_size(&self) -> Result<u64, CacheError> {
        Err(CacheError::NotImplemented("total_size"))
    }
}

impl std::fmt::Debug for dyn EvictionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn EvictionStrategy")
    }
}

// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The cache facade.
//!
//! [`Cache`] is the public entry point: it owns the storage handle, resolves
//! the eviction strategy once at construction, forwards operations to it, and
//! exposes the prune-event channel.
//!
//! # Concurrency
//!
//! One logical operation fans out into several non-atomic sub-store
//! operations (read indirection → rewrite index entry → repoint indirection,
//! read total → write total). The facade therefore serializes every operation
//! on a cache instance behind a single `tokio::sync::Mutex`; concurrent
//! callers queue rather than interleave, which preserves the data-model
//! invariants without requiring transactions from the storage collaborator.
//! No cancellation or timeout contract is provided; wrap calls externally if
//! you need one.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::config::CacheOptions;
use crate::events::PruneNotifier;
use crate::storage::OrderedStorage;
use crate::strategy::{
    CacheError, CacheHit, EvictionStrategy, StrategyContext, StrategyRegistry,
};

/// A size-bounded cache over ordered namespaced key-value storage.
pub struct Cache {
    strategy: Box<dyn EvictionStrategy>,
    notifier: PruneNotifier,
    /// Serializes all operations on this instance (see module docs).
    op_lock: Mutex<()>,
}

impl Cache {
    /// Build a cache over `storage` with the built-in strategy registry.
    ///
    /// Fails with [`CacheError::UnknownStrategy`] before any storage access
    /// when the configured policy cannot be resolved.
    pub fn new(storage: Arc<dyn OrderedStorage>, options: CacheOptions) -> Result<Self, CacheError> {
        Self::with_registry(storage, options, &StrategyRegistry::with_builtins())
    }

    /// Build a cache resolving the policy against a caller-supplied registry.
    pub fn with_registry(
        storage: Arc<dyn OrderedStorage>,
        options: CacheOptions,
        registry: &StrategyRegistry,
    ) -> Result<Self, CacheError> {
        let notifier = PruneNotifier::new();
        let ctx = StrategyContext {
            storage,
            options,
            notifier: notifier.clone(),
        };
        let strategy = registry.create_strategy(&ctx)?;
        Ok(Self {
            strategy,
            notifier,
            op_lock: Mutex::new(()),
        })
    }

    /// Look up a key. `None` on a miss; a hit refreshes the entry's position
    /// per the active policy and yields the stored value (under
    /// `store_values`) or the refreshed generated key.
    pub async fn get(&self, key: &str) -> Result<Option<CacheHit>, CacheError> {
        let _guard = self.op_lock.lock().await;
        self.strategy.get(key).await
    }

    /// Insert or replace an entry. May trigger a prune when the size total
    /// reaches the threshold. Returns the assigned generated key.
    pub async fn put(&self, key: &str, value: &Value) -> Result<String, CacheError> {
        let _guard = self.op_lock.lock().await;
        self.strategy.put(key, value).await
    }

    /// Remove an entry. Returns its generated key, or `None` if absent.
    pub async fn del(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _guard = self.op_lock.lock().await;
        self.strategy.del(key).await
    }

    /// Evict per the active policy until the size total is within the
    /// threshold. Returns the evicted logical keys (also published on the
    /// prune-event channel).
    pub async fn prune(&self) -> Result<Vec<String>, CacheError> {
        let _guard = self.op_lock.lock().await;
        self.strategy.prune().await
    }

    /// Running total of live entry sizes in bytes.
    pub async fn total_size(&self) -> Result<u64, CacheError> {
        let _guard = self.op_lock.lock().await;
        self.strategy.total_size().await
    }

    /// Subscribe to prune events: one message per completed prune cycle,
    /// carrying the ordered evicted logical keys. Empty prunes are not
    /// published.
    #[must_use]
    pub fn prune_events(&self) -> broadcast::Receiver<Vec<String>> {
        self.notifier.subscribe()
    }
}

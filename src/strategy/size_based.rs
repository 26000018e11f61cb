// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Size-based eviction: the shared accounting core and the LRU policy.
//!
//! Recency is tracked without any linked-list structure: every access
//! re-keys the entry under a fresh monotonic generated key, so the ordered
//! index sub-store's native sort order is the recency order. The oldest
//! entries sort first, and the prune loop walks the index from that end.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::{CacheError, CacheHit, EvictionStrategy, StrategyContext};
use crate::events::PruneNotifier;
use crate::keys::MonotonicClock;
use crate::metrics;
use crate::storage::{IterateOptions, OrderedStorage, StorageError, SubStore};

/// Key of the running size total inside the `conf` sub-store.
const TOTAL_SIZE_KEY: &str = "totalSize";

/// Metadata record stored in the `keys` sub-store under the generated key.
///
/// Exists iff the logical key is live. The size is computed once at put time
/// and only ever read back afterwards, never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The caller-visible key.
    pub key: String,
    /// Entry size in bytes as recorded at insertion.
    pub size: u64,
}

/// Sub-store handles and accounting shared by the size-based policies.
///
/// LRU is this core with nothing added; LFU composes it with a frequency
/// sub-store.
pub(crate) struct StrategyCore {
    /// `conf` sub-store: holds the running size total.
    conf: Arc<dyn SubStore>,
    /// `keys` sub-store: generated key → [`IndexEntry`], ordered by recency.
    pub(crate) keys: Arc<dyn SubStore>,
    /// `full` sub-store: logical key → current generated key.
    pub(crate) full: Arc<dyn SubStore>,
    /// `data` sub-store: logical key → serialized value. Only when
    /// `store_values` is set.
    data: Option<Arc<dyn SubStore>>,
    clock: MonotonicClock,
    notifier: PruneNotifier,
    threshold: u64,
}

impl StrategyCore {
    pub(crate) fn new(ctx: &StrategyContext) -> Self {
        let data = ctx
            .options
            .store_values
            .then(|| ctx.storage.sub("data"));
        Self {
            conf: ctx.storage.sub("conf"),
            keys: ctx.storage.sub("keys"),
            full: ctx.storage.sub("full"),
            data,
            clock: MonotonicClock::new(),
            notifier: ctx.notifier.clone(),
            threshold: ctx.options.threshold(),
        }
    }

    pub(crate) fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Running total of live entry sizes. Absent or unparseable counts as 0.
    pub(crate) async fn total_size(&self) -> Result<u64, CacheError> {
        let raw = self.conf.get(TOTAL_SIZE_KEY).await?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or(0))
    }

    pub(crate) async fn set_total_size(&self, size: u64) -> Result<(), CacheError> {
        self.conf.put(TOTAL_SIZE_KEY, &size.to_string()).await?;
        metrics::set_size_bytes(size);
        Ok(())
    }

    /// Entry size: canonical serialization of the value plus the generated
    /// key. Never fails on null or empty values (`null` serializes to 4
    /// bytes).
    pub(crate) fn calculate_size(
        &self,
        generated_key: &str,
        value: &Value,
    ) -> Result<u64, CacheError> {
        let serialized = serde_json::to_string(value)?;
        Ok(serialized.len() as u64 + generated_key.len() as u64)
    }

    /// Fresh generated key for a logical key.
    pub(crate) fn generate_key(&self, key: &str) -> String {
        self.clock.generate_key(key)
    }

    /// Current generated key for a logical key, if live.
    pub(crate) async fn current_generated(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.full.get(key).await?)
    }

    pub(crate) async fn read_index_entry(
        &self,
        generated_key: &str,
    ) -> Result<Option<IndexEntry>, CacheError> {
        match self.keys.get(generated_key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Remove the index record and indirection pointer of a live key,
    /// returning its generated key and metadata. Leaves `data` (and any
    /// policy side index) to the caller.
    pub(crate) async fn take_live(
        &self,
        key: &str,
    ) -> Result<Option<(String, IndexEntry)>, CacheError> {
        let Some(generated) = self.current_generated(key).await? else {
            return Ok(None);
        };
        let entry = self
            .read_index_entry(&generated)
            .await?
            .ok_or_else(|| dangling_index(key, &generated))?;
        self.keys.del(&generated).await?;
        self.full.del(key).await?;
        Ok(Some((generated, entry)))
    }

    /// Write the index record and indirection pointer (and the value, when
    /// values are stored) for an entry.
    pub(crate) async fn write_entry(
        &self,
        key: &str,
        generated_key: &str,
        entry: &IndexEntry,
        value: &Value,
    ) -> Result<(), CacheError> {
        self.keys
            .put(generated_key, &serde_json::to_string(entry)?)
            .await?;
        self.full.put(key, generated_key).await?;
        if let Some(data) = &self.data {
            data.put(key, &serde_json::to_string(value)?).await?;
        }
        Ok(())
    }

    /// Re-key a live entry under a fresh generated key, refreshing its
    /// recency position. Returns the fresh key.
    pub(crate) async fn rekey(
        &self,
        key: &str,
        old_generated: &str,
        entry: &IndexEntry,
    ) -> Result<String, CacheError> {
        let fresh = self.generate_key(key);
        self.keys
            .put(&fresh, &serde_json::to_string(entry)?)
            .await?;
        self.keys.del(old_generated).await?;
        self.full.put(key, &fresh).await?;
        Ok(fresh)
    }

    /// What a hit returns: the stored value under `store_values`, else the
    /// entry's current generated key.
    pub(crate) async fn hit(&self, key: &str, generated_key: &str) -> Result<CacheHit, CacheError> {
        match &self.data {
            Some(data) => {
                let raw = data
                    .get(key)
                    .await?
                    .ok_or_else(|| dangling_index(key, generated_key))?;
                Ok(CacheHit::Value(serde_json::from_str(&raw)?))
            }
            None => Ok(CacheHit::GeneratedKey(generated_key.to_string())),
        }
    }

    /// Remove every base record for a live key and settle the size total.
    /// Returns the removed generated key.
    pub(crate) async fn delete_entry(&self, key: &str) -> Result<Option<String>, CacheError> {
        let Some((generated, entry)) = self.take_live(key).await? else {
            return Ok(None);
        };
        if let Some(data) = &self.data {
            data.del(key).await?;
        }
        let total = self.total_size().await?.saturating_sub(entry.size);
        self.set_total_size(total).await?;
        Ok(Some(generated))
    }

    /// Drop one entry's records during a prune (index, indirection, value).
    pub(crate) async fn evict_entry(
        &self,
        generated_key: &str,
        entry: &IndexEntry,
    ) -> Result<(), CacheError> {
        self.keys.del(generated_key).await?;
        self.full.del(&entry.key).await?;
        if let Some(data) = &self.data {
            data.del(&entry.key).await?;
        }
        Ok(())
    }

    /// Persist the post-prune total and announce the evictions.
    pub(crate) async fn finish_prune(
        &self,
        total: u64,
        evicted: &[String],
    ) -> Result<(), CacheError> {
        self.set_total_size(total).await?;
        if !evicted.is_empty() {
            metrics::record_evictions(evicted.len() as u64);
            info!(evicted = evicted.len(), total_size = total, "pruned cache");
        }
        self.notifier.publish(evicted.to_vec());
        Ok(())
    }
}

pub(crate) fn dangling_index(key: &str, generated_key: &str) -> CacheError {
    StorageError::Backend(format!(
        "dangling index record for '{key}' (generated key '{generated_key}')"
    ))
    .into()
}

/// Size-based LRU eviction.
///
/// Every `get` hit re-keys the entry to the newest position in the ordered
/// index; `prune` walks the index oldest-first.
pub struct SizeBasedStrategy {
    core: StrategyCore,
}

impl SizeBasedStrategy {
    #[must_use]
    pub fn new(ctx: &StrategyContext) -> Self {
        Self {
            core: StrategyCore::new(ctx),
        }
    }
}

#[async_trait]
impl EvictionStrategy for SizeBasedStrategy {
    async fn put(&self, key: &str, value: &Value) -> Result<String, CacheError> {
        // Replacing a live key drops its old records first, so the prune
        // below can never see two index entries for one logical key.
        let replaced = self.core.take_live(key).await?;
        let mut total = self.core.total_size().await?;
        if let Some((_, old)) = &replaced {
            total = total.saturating_sub(old.size);
        }

        let generated = self.core.generate_key(key);
        let size = self.core.calculate_size(&generated, value)?;
        total += size;
        self.core.set_total_size(total).await?;

        // The new entry is not indexed yet, so the prune only ever evicts
        // already-durable entries, never the one in flight.
        if total >= self.core.threshold() {
            self.prune().await?;
        }

        let entry = IndexEntry {
            key: key.to_string(),
            size,
        };
        self.core.write_entry(key, &generated, &entry, value).await?;

        debug!(key, generated_key = %generated, size, "cache put");
        metrics::record_operation("put");
        Ok(generated)
    }

    async fn get(&self, key: &str) -> Result<Option<CacheHit>, CacheError> {
        let Some(generated) = self.core.current_generated(key).await? else {
            metrics::record_miss();
            debug!(key, "cache miss");
            return Ok(None);
        };
        let entry = self
            .core
            .read_index_entry(&generated)
            .await?
            .ok_or_else(|| dangling_index(key, &generated))?;

        // Touch: move the entry to the newest end of the index.
        let fresh = self.core.rekey(key, &generated, &entry).await?;

        metrics::record_hit();
        debug!(key, generated_key = %fresh, "cache hit");
        self.core.hit(key, &fresh).await.map(Some)
    }

    async fn del(&self, key: &str) -> Result<Option<String>, CacheError> {
        let removed = self.core.delete_entry(key).await?;
        if removed.is_some() {
            debug!(key, "cache delete");
            metrics::record_operation("del");
        }
        Ok(removed)
    }

    async fn prune(&self) -> Result<Vec<String>, CacheError> {
        let mut total = self.core.total_size().await?;
        let mut evicted = Vec::new();

        // Ascending generated-key order is oldest-first.
        let index = self.core.keys.iterate(IterateOptions::default()).await?;
        for (generated, raw) in index {
            if total <= self.core.threshold() {
                break;
            }
            let entry: IndexEntry = serde_json::from_str(&raw)?;
            total = total.saturating_sub(entry.size);
            self.core.evict_entry(&generated, &entry).await?;
            evicted.push(entry.key);
        }

        self.core.finish_prune(total, &evicted).await?;
        Ok(evicted)
    }

    async fn total_size(&self) -> Result<u64, CacheError> {
        self.core.total_size().await
    }
}

// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Least Frequently Used eviction.
//!
//! Size accounting and re-keying work exactly as in the size-based core; on
//! top of that, every live entry has a row in the `frequency` sub-store
//! (generated key → access count). Prune order is lowest count first, ties
//! broken by generated key ascending, which is insertion order and therefore
//! deterministic.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::size_based::{dangling_index, IndexEntry, StrategyCore};
use super::{CacheError, CacheHit, EvictionStrategy, StrategyContext};
use crate::metrics;
use crate::storage::{IterateOptions, OrderedStorage, SubStore};

pub struct LfuStrategy {
    core: StrategyCore,
    /// `frequency` sub-store: generated key → access count (decimal, ≥ 1).
    frequency: Arc<dyn SubStore>,
}

impl LfuStrategy {
    #[must_use]
    pub fn new(ctx: &StrategyContext) -> Self {
        Self {
            core: StrategyCore::new(ctx),
            frequency: ctx.storage.sub("frequency"),
        }
    }

    async fn count(&self, generated_key: &str) -> Result<u64, CacheError> {
        let raw = self.frequency.get(generated_key).await?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or(0))
    }

    /// Move a frequency row to a fresh generated key, bumping the count.
    async fn repoint(
        &self,
        old_generated: &str,
        new_generated: &str,
    ) -> Result<u64, CacheError> {
        let bumped = self.count(old_generated).await? + 1;
        self.frequency.del(old_generated).await?;
        self.frequency
            .put(new_generated, &bumped.to_string())
            .await?;
        Ok(bumped)
    }
}

#[async_trait]
impl EvictionStrategy for LfuStrategy {
    async fn put(&self, key: &str, value: &Value) -> Result<String, CacheError> {
        // On replace, carry the access count across the re-key instead of
        // resetting it.
        let replaced = self.core.take_live(key).await?;
        let mut total = self.core.total_size().await?;
        let mut carried = 0;
        if let Some((old_generated, old)) = &replaced {
            total = total.saturating_sub(old.size);
            carried = self.count(old_generated).await?;
            self.frequency.del(old_generated).await?;
        }

        let generated = self.core.generate_key(key);
        let size = self.core.calculate_size(&generated, value)?;
        total += size;
        self.core.set_total_size(total).await?;

        if total >= self.core.threshold() {
            self.prune().await?;
        }

        let entry = IndexEntry {
            key: key.to_string(),
            size,
        };
        self.core.write_entry(key, &generated, &entry, value).await?;
        self.frequency
            .put(&generated, &(carried + 1).to_string())
            .await?;

        debug!(key, generated_key = %generated, size, count = carried + 1, "cache put");
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

        // The recency refresh re-keys the entry; the frequency row follows
        // the key with its count bumped, never reset.
        let fresh = self.core.rekey(key, &generated, &entry).await?;
        let count = self.repoint(&generated, &fresh).await?;

        metrics::record_hit();
        debug!(key, generated_key = %fresh, count, "cache hit");
        self.core.hit(key, &fresh).await.map(Some)
    }

    async fn del(&self, key: &str) -> Result<Option<String>, CacheError> {
        let removed = self.core.delete_entry(key).await?;
        if let Some(generated) = &removed {
            self.frequency.del(generated).await?;
            debug!(key, "cache delete");
            metrics::record_operation("del");
        }
        Ok(removed)
    }

    async fn prune(&self) -> Result<Vec<String>, CacheError> {
        let mut total = self.core.total_size().await?;
        let mut evicted = Vec::new();

        // Ascending iteration already orders equal counts by generated key,
        // i.e. insertion order; the explicit tie-break keeps that contract
        // independent of sort stability.
        let mut rows: Vec<(String, u64)> = self
            .frequency
            .iterate(IterateOptions::default())
            .await?
            .into_iter()
            .map(|(generated, raw)| (generated, raw.parse().unwrap_or(0)))
            .collect();
        rows.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        for (generated, _count) in rows {
            if total <= self.core.threshold() {
                break;
            }
            let Some(entry) = self.core.read_index_entry(&generated).await? else {
                // Stale frequency row; drop it and move on.
                self.frequency.del(&generated).await?;
                continue;
            };
            total = total.saturating_sub(entry.size);
            self.core.evict_entry(&generated, &entry).await?;
            self.frequency.del(&generated).await?;
            evicted.push(entry.key);
        }

        self.core.finish_prune(total, &evicted).await?;
        Ok(evicted)
    }

    async fn total_size(&self) -> Result<u64, CacheError> {
        self.core.total_size().await
    }
}

// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Cache Engine
//!
//! A pluggable, size-bounded cache layer over ordered namespaced key-value
//! storage, with swappable eviction policies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Cache Facade                         │
//! │  • get / put / del / prune, serialized per instance         │
//! │  • Prune-event channel (evicted logical keys)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Eviction Strategy                        │
//! │  • LRU: ordered index IS the recency order (re-keying)      │
//! │  • LFU: frequency sub-store, lowest count evicted first     │
//! │  • Custom: registered by name or passed directly            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          (several sub-store operations per logical op)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Ordered Storage (external)                   │
//! │  • Namespaced sub-stores: conf, keys, full, data, frequency │
//! │  • Point get/put/del + ordered iteration                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recency needs no linked list: every access re-keys the entry under a
//! fresh monotonic generated key (`<timestamp>.<logical key>`), so the
//! ordered store's native sort order tracks recency by construction.
//!
//! ## Quick Start
//!
//! ```rust
//! use cache_engine::{Cache, CacheOptions, MemoryStorage};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cache_engine::CacheError> {
//!     let cache = Cache::new(
//!         Arc::new(MemoryStorage::new()),
//!         CacheOptions {
//!             max_size_bytes: 1024,
//!             store_values: true,
//!             strategy: "LRU".into(),
//!             ..Default::default()
//!         },
//!     )?;
//!
//!     cache.put("foo", &json!("bar")).await?;
//!     let hit = cache.get("foo").await?;
//!     assert_eq!(hit.and_then(|h| h.into_value()), Some(json!("bar")));
//!
//!     // Watch evictions
//!     let _events = cache.prune_events();
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: The [`Cache`] facade
//! - [`strategy`]: Eviction policies and the [`StrategyRegistry`]
//! - [`storage`]: Storage traits and the in-memory reference backend
//! - [`events`]: The prune-event channel
//! - [`keys`]: Generated-key construction
//! - [`config`]: [`CacheOptions`]

pub mod cache;
pub mod config;
pub mod events;
pub mod keys;
pub mod metrics;
pub mod storage;
pub mod strategy;

pub use cache::Cache;
pub use config::{CacheOptions, StrategySelector};
pub use events::PruneNotifier;
pub use keys::MonotonicClock;
pub use storage::{
    IterateOptions, MemoryStorage, OrderedStorage, StorageError, SubStore,
};
pub use strategy::{
    CacheError, CacheHit, EvictionStrategy, LfuStrategy, SizeBasedStrategy, StrategyConstructor,
    StrategyContext, StrategyRegistry,
};
pub use strategy::size_based::IndexEntry;

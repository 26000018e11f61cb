// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic cache-engine usage example.
//!
//! Demonstrates:
//! 1. Building a small LRU cache over the in-memory backend
//! 2. Watching prune events
//! 3. Filling the cache past its threshold
//! 4. Observing which keys survived
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use cache_engine::{Cache, CacheOptions, MemoryStorage};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    // A deliberately tiny cache so evictions happen quickly.
    let cache = Cache::new(
        Arc::new(MemoryStorage::new()),
        CacheOptions {
            max_size_bytes: 256,
            store_values: true,
            strategy: "LRU".into(),
            ..Default::default()
        },
    )?;

    let mut events = cache.prune_events();

    println!("Inserting 16 entries into a 256-byte cache...");
    for i in 0..16 {
        cache
            .put(&format!("item-{i:02}"), &json!({"n": i, "payload": "xxxxxxxxxx"}))
            .await?;
    }

    // Keep item-00 warm so the LRU policy spares it.
    cache.get("item-00").await?;
    cache
        .put("one-more", &json!({"payload": "yyyyyyyyyy"}))
        .await?;

    println!("\nPrune events:");
    while let Ok(evicted) = events.try_recv() {
        println!("  evicted: {evicted:?}");
    }

    println!("\nSurvivors:");
    for i in 0..16 {
        let key = format!("item-{i:02}");
        if cache.get(&key).await?.is_some() {
            println!("  {key}");
        }
    }

    println!("\nTotal size: {} bytes", cache.total_size().await?);
    Ok(())
}

// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Property-based tests for the cache engine.
//!
//! Drives arbitrary operation sequences and payloads through the public
//! facade and verifies that the size invariant holds and nothing panics.
//!
//! Run with: `cargo test --test proptest_fuzz`

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use cache_engine::{
    Cache, CacheOptions, IndexEntry, IterateOptions, MemoryStorage, OrderedStorage, SubStore,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Cache operations the fuzzer interleaves.
#[derive(Debug, Clone)]
enum Op {
    Put(String, Value),
    Get(String),
    Del(String),
    Prune,
}

fn key_strategy() -> impl Strategy<Value = String> {
    // Small key space so operations collide on purpose.
    "[a-f]{1,3}"
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-z0-9 ]{0,32}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..8)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => key_strategy().prop_map(Op::Get),
        2 => key_strategy().prop_map(Op::Del),
        1 => Just(Op::Prune),
    ]
}

fn run_ops(strategy_name: &str, max_size_bytes: u64, ops: Vec<Op>) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        let storage = Arc::new(MemoryStorage::new());
        let cache = Cache::new(
            Arc::clone(&storage) as Arc<dyn OrderedStorage>,
            CacheOptions {
                max_size_bytes,
                store_values: true,
                strategy: strategy_name.into(),
                ..Default::default()
            },
        )
        .unwrap();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    cache.put(&key, &value).await.unwrap();
                }
                Op::Get(key) => {
                    cache.get(&key).await.unwrap();
                }
                Op::Del(key) => {
                    cache.del(&key).await.unwrap();
                }
                Op::Prune => {
                    cache.prune().await.unwrap();
                }
            }
        }

        // Invariant: the persisted total equals the sum of recorded sizes
        // over all live index entries.
        let summed: u64 = storage
            .sub("keys")
            .iterate(IterateOptions::default())
            .await
            .unwrap()
            .iter()
            .map(|(_, raw)| serde_json::from_str::<IndexEntry>(raw).unwrap().size)
            .sum();
        assert_eq!(cache.total_size().await.unwrap(), summed);

        // Invariant: every index entry has a matching indirection pointer.
        let full = storage.sub("full");
        for (generated, raw) in storage
            .sub("keys")
            .iterate(IterateOptions::default())
            .await
            .unwrap()
        {
            let entry: IndexEntry = serde_json::from_str(&raw).unwrap();
            let pointer = full.get(&entry.key).await.unwrap();
            assert_eq!(pointer.as_deref(), Some(generated.as_str()));
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Arbitrary op sequences keep the LRU cache consistent.
    #[test]
    fn fuzz_lru_op_sequences(ops in prop::collection::vec(op_strategy(), 0..40)) {
        run_ops("LRU", 512, ops);
    }

    /// Arbitrary op sequences keep the LFU cache consistent.
    #[test]
    fn fuzz_lfu_op_sequences(ops in prop::collection::vec(op_strategy(), 0..40)) {
        run_ops("LFU", 512, ops);
    }

    /// Values round-trip through put/get regardless of shape.
    #[test]
    fn fuzz_round_trip(value in value_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let cache = Cache::new(
                Arc::new(MemoryStorage::new()),
                CacheOptions {
                    max_size_bytes: 1024 * 1024,
                    store_values: true,
                    ..Default::default()
                },
            )
            .unwrap();

            cache.put("k", &value).await.unwrap();
            let hit = cache.get("k").await.unwrap().unwrap();
            prop_assert_eq!(hit.into_value(), Some(value));
            Ok(())
        })?;
    }

    /// A cache with a tiny cap stays at or near the cap under load.
    #[test]
    fn fuzz_size_stays_bounded(keys in prop::collection::vec(key_strategy(), 1..60)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let cache = Cache::new(
                Arc::new(MemoryStorage::new()),
                CacheOptions {
                    max_size_bytes: 256,
                    store_values: true,
                    ..Default::default()
                },
            )
            .unwrap();

            for key in &keys {
                cache.put(key, &json!({"payload": "0123456789"})).await.unwrap();
            }

            // After any put that crossed the threshold, pruning brought the
            // durable set back within it; at most one in-flight entry sits
            // on top.
            let total = cache.total_size().await.unwrap();
            let threshold = 256 - 25;
            let max_entry = 64; // generous bound for one entry of this shape
            prop_assert!(total <= threshold + max_entry, "total {} too large", total);
            Ok(())
        })?;
    }
}

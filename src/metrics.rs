// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for cache-engine.
//!
//! Uses the `metrics` crate for backend-agnostic collection; the host
//! application picks the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `cache_engine_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_bytes` suffix for sizes

use metrics::{counter, gauge};

/// Record a completed cache operation.
pub fn record_operation(operation: &str) {
    counter!(
        "cache_engine_operations_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a lookup that found a live entry.
pub fn record_hit() {
    counter!("cache_engine_lookups_total", "result" => "hit").increment(1);
}

/// Record a lookup that missed.
pub fn record_miss() {
    counter!("cache_engine_lookups_total", "result" => "miss").increment(1);
}

/// Record entries removed by one prune cycle.
pub fn record_evictions(count: u64) {
    counter!("cache_engine_evictions_total").increment(count);
}

/// Track the running total of live entry sizes.
pub fn set_size_bytes(size: u64) {
    gauge!("cache_engine_size_bytes").set(size as f64);
}

// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Generated-key construction.
//!
//! Every live entry is indexed under a generated key of the form
//! `<timestamp>.<logical key>`, where the timestamp is a zero-padded
//! monotonic microsecond counter. Zero-padding to a fixed width makes the
//! index sub-store's lexicographic order the temporal order, so the ordered
//! store's native sort IS the recency order and no linked-list bookkeeping
//! is needed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Width of the encoded timestamp. 20 digits holds any u64.
const TIMESTAMP_WIDTH: usize = 20;

/// Issues strictly increasing timestamps for one cache instance.
///
/// Wall-clock microseconds, bumped past the previous issue when the clock
/// stalls or steps backwards. Two calls never return the same value.
pub struct MonotonicClock {
    last: AtomicU64,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next timestamp: `max(now_micros, previous + 1)`.
    pub fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .map(|last| now.max(last + 1))
            .unwrap_or(now)
    }

    /// Builds the generated key for a logical key at the next timestamp.
    #[must_use]
    pub fn generate_key(&self, logical_key: &str) -> String {
        format!(
            "{:0width$}.{}",
            self.next(),
            logical_key,
            width = TIMESTAMP_WIDTH
        )
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

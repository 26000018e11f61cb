// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Eviction notification channel.
//!
//! One `"prune"` event per completed prune cycle, carrying the ordered list
//! of evicted logical keys. Built on `tokio::sync::broadcast`: subscribers
//! come and go freely, and publishing with no subscribers is a no-op.

use tokio::sync::broadcast;

/// Buffered prune events per subscriber before lagging ones drop messages.
const CHANNEL_CAPACITY: usize = 64;

/// Publish side of the prune-event channel.
///
/// Handed to the active eviction strategy at construction; the strategy
/// publishes once per prune, after all storage mutations for that prune.
#[derive(Clone)]
pub struct PruneNotifier {
    tx: broadcast::Sender<Vec<String>>,
}

impl PruneNotifier {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// New receiver for subsequent prune events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
        self.tx.subscribe()
    }

    /// Publish one prune cycle's evicted keys. Empty lists are suppressed.
    pub fn publish(&self, evicted: Vec<String>) {
        if evicted.is_empty() {
            return;
        }
        // Err means no live subscribers, which is fine.
        let _ = self.tx.send(evicted);
    }
}

impl Default for PruneNotifier {
    fn default() -> Self {
        Self::new()
    }
}

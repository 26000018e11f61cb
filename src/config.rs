// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache configuration.
//!
//! # Example
//!
//! ```
//! use cache_engine::CacheOptions;
//!
//! // Minimal options (uses defaults)
//! let options = CacheOptions::default();
//! assert_eq!(options.max_size_bytes, 1024);
//!
//! // Full options
//! let options = CacheOptions {
//!     max_size_bytes: 64,
//!     store_values: true,
//!     strategy: "LFU".into(),
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::strategy::registry::StrategyConstructor;

/// Configuration for one cache instance.
///
/// All fields have defaults; an empty config gives a 1 KiB LRU cache that
/// stores metadata only.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheOptions {
    /// Hard size ceiling in bytes before threshold pruning (default: 1024)
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Item-count cap (default: 50). Reserved for count-based capping; the
    /// size-based strategies do not enforce it.
    #[serde(default = "default_max_size_items")]
    pub max_size_items: u64,

    /// Whether raw values are persisted in the `data` sub-store and returned
    /// on `get` (default: false, metadata only)
    #[serde(default)]
    pub store_values: bool,

    /// Eviction policy: a registered name (`"LRU"`, `"LFU"`, or anything
    /// registered on the [`StrategyRegistry`](crate::StrategyRegistry)), or a
    /// custom constructor passed directly
    #[serde(default)]
    pub strategy: StrategySelector,
}

fn default_max_size_bytes() -> u64 {
    1024
}

fn default_max_size_items() -> u64 {
    50
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            max_size_items: default_max_size_items(),
            store_values: false,
            strategy: StrategySelector::default(),
        }
    }
}

impl CacheOptions {
    /// Prune target: 10% headroom below the hard cap, so one prune buys room
    /// for several subsequent puts.
    #[must_use]
    pub fn threshold(&self) -> u64 {
        self.max_size_bytes - self.max_size_bytes / 10
    }
}

/// How the eviction policy is chosen.
#[derive(Clone, Default)]
pub enum StrategySelector {
    /// Look the name up in the strategy registry (default: `"LRU"`).
    #[default]
    Default,
    /// A registered policy name.
    Named(String),
    /// A constructor used directly, bypassing the registry.
    Custom(StrategyConstructor),
}

impl StrategySelector {
    /// The registry name to resolve, if this selector goes through the
    /// registry at all.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Default => Some("LRU"),
            Self::Named(name) => Some(name),
            Self::Custom(_) => None,
        }
    }
}

impl From<&str> for StrategySelector {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for StrategySelector {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl fmt::Debug for StrategySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Named(name) => write!(f, "Named({name:?})"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

// Config files can only name a registered policy; custom constructors are
// code, not data.
impl<'de> Deserialize<'de> for StrategySelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::Named(name))
    }
}

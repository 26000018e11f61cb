// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Strategy registry and factory.
//!
//! An explicit name → constructor map rather than ambient global state.
//! Every registry starts with the `"LRU"` and `"LFU"` built-ins; hosts may
//! register additional named policies, or bypass the registry entirely by
//! putting a constructor straight into
//! [`CacheOptions::strategy`](crate::CacheOptions).

use std::collections::HashMap;
use std::sync::Arc;

use super::lfu::LfuStrategy;
use super::size_based::SizeBasedStrategy;
use super::{CacheError, EvictionStrategy, StrategyContext};
use crate::config::StrategySelector;

/// Builds a strategy instance bound to one cache's context.
pub type StrategyConstructor =
    Arc<dyn Fn(&StrategyContext) -> Box<dyn EvictionStrategy> + Send + Sync>;

pub struct StrategyRegistry {
    strategies: HashMap<String, StrategyConstructor>,
}

impl StrategyRegistry {
    /// Registry pre-populated with the built-in policies.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register("LRU", |ctx| Box::new(SizeBasedStrategy::new(ctx)));
        registry.register("LFU", |ctx| Box::new(LfuStrategy::new(ctx)));
        registry
    }

    /// Register (or replace) a named policy.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&StrategyContext) -> Box<dyn EvictionStrategy> + Send + Sync + 'static,
    {
        self.strategies
            .insert(name.to_string(), Arc::new(constructor));
    }

    /// Resolve the selector in `ctx.options.strategy` and build the strategy.
    ///
    /// Fails with [`CacheError::UnknownStrategy`] when a named policy is not
    /// registered. Touches no storage.
    pub fn create_strategy(
        &self,
        ctx: &StrategyContext,
    ) -> Result<Box<dyn EvictionStrategy>, CacheError> {
        match &ctx.options.strategy {
            StrategySelector::Custom(constructor) => Ok(constructor(ctx)),
            selector => {
                let name = selector.name().unwrap_or("LRU");
                let constructor = self
                    .strategies
                    .get(name)
                    .ok_or_else(|| CacheError::UnknownStrategy(name.to_string()))?;
                Ok(constructor(ctx))
            }
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheOptions;
    use crate::events::PruneNotifier;
    use crate::storage::{MemoryStorage, OrderedStorage, SubStore};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    fn context(options: CacheOptions) -> StrategyContext {
        StrategyContext {
            storage: Arc::new(MemoryStorage::new()),
            options,
            notifier: PruneNotifier::new(),
        }
    }

    #[tokio::test]
    async fn test_resolves_builtin_lru_by_default() {
        let registry = StrategyRegistry::with_builtins();
        let ctx = context(CacheOptions::default());

        let strategy = registry.create_strategy(&ctx).unwrap();
        strategy.put("foo", &json!("bar")).await.unwrap();
        assert!(strategy.get("foo").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resolves_builtin_lfu_by_name() {
        let registry = StrategyRegistry::with_builtins();
        let ctx = context(CacheOptions {
            strategy: "LFU".into(),
            ..Default::default()
        });

        let strategy = registry.create_strategy(&ctx).unwrap();
        let generated = strategy.put("foo", &json!("bar")).await.unwrap();

        // Only the LFU policy writes frequency rows.
        let count = ctx.storage.sub("frequency").get(&generated).await.unwrap();
        assert_eq!(count.as_deref(), Some("1"));
    }

    #[test]
    fn test_unknown_name_fails() {
        let registry = StrategyRegistry::with_builtins();
        let ctx = context(CacheOptions {
            strategy: "NOPE".into(),
            ..Default::default()
        });

        let err = registry.create_strategy(&ctx).unwrap_err();
        assert!(matches!(err, CacheError::UnknownStrategy(name) if name == "NOPE"));
    }

    struct NoopStrategy;

    #[async_trait]
    impl crate::strategy::EvictionStrategy for NoopStrategy {
        async fn put(&self, key: &str, _value: &Value) -> Result<String, CacheError> {
            Ok(format!("noop.{key}"))
        }

        async fn get(&self, _key: &str) -> Result<Option<crate::CacheHit>, CacheError> {
            Ok(None)
        }

        async fn del(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Ok(None)
        }

        async fn prune(&self) -> Result<Vec<String>, CacheError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_registered_custom_policy() {
        let mut registry = StrategyRegistry::with_builtins();
        registry.register("NOOP", |_ctx| Box::new(NoopStrategy));

        let ctx = context(CacheOptions {
            strategy: "NOOP".into(),
            ..Default::default()
        });
        let strategy = registry.create_strategy(&ctx).unwrap();
        assert_eq!(strategy.put("k", &json!(1)).await.unwrap(), "noop.k");
    }

    #[tokio::test]
    async fn test_custom_constructor_bypasses_registry() {
        let registry = StrategyRegistry::with_builtins();
        let ctx = context(CacheOptions {
            strategy: StrategySelector::Custom(Arc::new(|_ctx| Box::new(NoopStrategy))),
            ..Default::default()
        });

        let strategy = registry.create_strategy(&ctx).unwrap();
        assert_eq!(strategy.put("k", &json!(1)).await.unwrap(), "noop.k");
    }

    #[tokio::test]
    async fn test_unimplemented_capability_reports_not_implemented() {
        let strategy = NoopStrategy;
        let err = strategy.total_size().await.unwrap_err();
        assert!(matches!(err, CacheError::NotImplemented("total_size")));
    }
}

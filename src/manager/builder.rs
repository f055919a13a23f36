//! Builder

use super::{AfterPushHook, Matcher, QueueManager, State};
use crate::config::{Config, DEFAULT_KEY_CAPACITY};
use crate::strategy::{Strategy, StrategyKind};
use crate::TaskQueueError;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Builder for [`QueueManager`]
///
/// Defaults: round-robin strategy, per-key capacity of
/// [`DEFAULT_KEY_CAPACITY`], no hooks, no keys, and the source key excluded
/// from automatic rebalancing.
pub struct QueueManagerBuilder<T, K> {
    strategy: Box<dyn Strategy<K, T>>,
    hooks: Vec<AfterPushHook<K, T>>,
    capacity: usize,
    keys: Vec<K>,
    exclude_source_on_auto_transform: bool,
}

impl<T, K> QueueManagerBuilder<T, K>
where
    T: Send + Sync + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self {
            strategy: StrategyKind::default().build(),
            hooks: Vec::new(),
            capacity: DEFAULT_KEY_CAPACITY,
            keys: Vec::new(),
            exclude_source_on_auto_transform: true,
        }
    }

    /// Create a builder from configuration, converting configured key names
    pub fn from_config(config: &Config) -> Self
    where
        K: From<String>,
    {
        Self::new()
            .strategy(config.strategy)
            .capacity(config.key_capacity)
            .keys(config.keys.iter().cloned().map(K::from))
            .exclude_source_on_auto_transform(config.exclude_source_on_auto_transform)
    }

    /// Use a built-in strategy
    pub fn strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = kind.build();
        self
    }

    /// Use a caller-provided strategy
    pub fn custom_strategy<S>(mut self, strategy: S) -> Self
    where
        S: Strategy<K, T> + 'static,
    {
        self.strategy = Box::new(strategy);
        self
    }

    /// Add a hook run after every push into a key queue
    pub fn after_push<F>(mut self, hook: F) -> Self
    where
        F: Fn(&K, &T) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Set the capacity of every key queue
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Register a key at construction
    pub fn key(mut self, key: K) -> Self {
        self.keys.push(key);
        self
    }

    /// Register several keys at construction, in order
    pub fn keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        self.keys.extend(keys);
        self
    }

    /// Whether automatic rebalancing may pick the key a task comes from.
    ///
    /// When allowed, the source counts the moved task as already removed, so
    /// a full source can still take its task back at the tail.
    pub fn exclude_source_on_auto_transform(mut self, exclude: bool) -> Self {
        self.exclude_source_on_auto_transform = exclude;
        self
    }

    /// Build a manager that compares tasks with `PartialEq`
    pub fn build(self) -> crate::Result<QueueManager<T, K>>
    where
        T: PartialEq,
    {
        self.build_with_matcher(|a: &T, b: &T| a == b)
    }

    /// Build a manager that compares tasks with `matcher`
    pub fn build_with_matcher<F>(self, matcher: F) -> crate::Result<QueueManager<T, K>>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        if self.capacity == 0 {
            return Err(TaskQueueError::ConfigError(
                "Key capacity must be greater than 0".to_string(),
            ));
        }

        {
            let mut seen = HashSet::with_capacity(self.keys.len());
            if let Some(key) = self.keys.iter().find(|key| !seen.insert(*key)) {
                return Err(TaskQueueError::DuplicateKey(format!("{key:?}")));
            }
        }

        info!(
            strategy = self.strategy.name(),
            capacity = self.capacity,
            keys = self.keys.len(),
            hooks = self.hooks.len(),
            "Queue manager created"
        );

        let matcher: Matcher<T> = Arc::new(matcher);
        Ok(QueueManager {
            state: RwLock::new(State::new(self.capacity, self.keys)),
            strategy: self.strategy,
            hooks: self.hooks,
            matcher,
            capacity: self.capacity,
            exclude_source_on_auto_transform: self.exclude_source_on_auto_transform,
        })
    }
}

impl<T, K> Default for QueueManagerBuilder<T, K>
where
    T: Send + Sync + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> QueueManager<T, K>
where
    T: PartialEq + Send + Sync + 'static,
    K: Eq + Hash + Clone + Debug + From<String> + Send + Sync + 'static,
{
    /// Build a manager from configuration with no hooks
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        config.validate()?;
        QueueManagerBuilder::from_config(config).build()
    }
}

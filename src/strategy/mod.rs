//! Key selection strategies
//!
//! A strategy looks at the manager's state through a [`SelectionContext`] and
//! picks the index of a key in registration order. It holds no state of its
//! own: the round-robin cursor lives in the manager and is advanced by the
//! manager once a selection is used.

/// Least-loaded selection
pub mod least;
/// Round-robin selection
pub mod round_robin;

pub use least::Least;
pub use round_robin::RoundRobin;

use crate::queue::key_queue::KeyQueue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Read-only view of the manager state handed to a strategy
pub struct SelectionContext<'a, K, T> {
    keys: &'a [K],
    queues: &'a HashMap<K, KeyQueue<T>>,
    cursor: Option<usize>,
    exclude: Option<&'a K>,
    released: Option<&'a K>,
}

impl<'a, K, T> SelectionContext<'a, K, T>
where
    K: Eq + Hash,
{
    /// Build a context over `keys` (registration order) and their queues
    pub fn new(keys: &'a [K], queues: &'a HashMap<K, KeyQueue<T>>, cursor: Option<usize>) -> Self {
        Self {
            keys,
            queues,
            cursor,
            exclude: None,
            released: None,
        }
    }

    /// Exclude one key from candidacy
    pub fn excluding(mut self, key: &'a K) -> Self {
        self.exclude = Some(key);
        self
    }

    /// Count one task of `key`'s queue as already gone, as when the task
    /// being placed is taken out of that queue
    pub fn releasing(mut self, key: &'a K) -> Self {
        self.released = Some(key);
        self
    }

    /// Number of registered keys
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Index of the last key a task was assigned to, if any
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Key at `index` in registration order
    pub fn key(&self, index: usize) -> Option<&'a K> {
        self.keys.get(index)
    }

    /// Queue of the key at `index`
    pub fn queue(&self, index: usize) -> Option<&'a KeyQueue<T>> {
        self.keys.get(index).and_then(|key| self.queues.get(key))
    }

    /// Length of the queue of the key at `index`, net of a released task
    pub fn queue_len(&self, index: usize) -> Option<usize> {
        let key = self.keys.get(index)?;
        let len = self.queues.get(key)?.len();
        if self.released == Some(key) {
            Some(len.saturating_sub(1))
        } else {
            Some(len)
        }
    }

    /// Check if the key at `index` can take one more task
    pub fn is_candidate(&self, index: usize) -> bool {
        let Some(key) = self.keys.get(index) else {
            return false;
        };
        if self.exclude == Some(key) {
            return false;
        }
        self.queues
            .get(key)
            .is_some_and(|queue| !queue.is_full() || self.released == Some(key))
    }
}

/// Trait for key selection policies
pub trait Strategy<K, T>: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Pick a key index whose queue can accept a task, or `None`
    fn select(&self, ctx: &SelectionContext<'_, K, T>) -> Option<usize>;
}

/// Built-in strategies selectable from configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Cycle through keys, skipping full queues
    #[default]
    RoundRobin,
    /// Pick the key with the shortest queue
    Least,
}

impl StrategyKind {
    /// Instantiate the strategy for a manager
    pub fn build<K, T>(self) -> Box<dyn Strategy<K, T>>
    where
        K: Eq + Hash,
    {
        match self {
            StrategyKind::RoundRobin => Box::new(RoundRobin),
            StrategyKind::Least => Box::new(Least),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::RoundRobin => write!(f, "round_robin"),
            StrategyKind::Least => write!(f, "least"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = crate::TaskQueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round_robin" | "roundrobin" | "round-robin" => Ok(StrategyKind::RoundRobin),
            "least" => Ok(StrategyKind::Least),
            _ => Err(crate::TaskQueueError::ConfigError(format!(
                "Invalid strategy: {}",
                s
            ))),
        }
    }
}

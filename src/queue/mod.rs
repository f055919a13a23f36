//! Keyed queue contract and the FIFO primitives behind it

/// Unbounded overflow queue
pub mod global;
/// Bounded per-key queue
pub mod key_queue;

use async_trait::async_trait;
use std::collections::HashMap;

/// Where `insert` placed a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment<K> {
    /// Appended to this key's queue
    Key(K),
    /// No key could accept the task; parked in the global queue at `position`
    Global {
        /// 0-based index in the global queue right after the push
        position: usize,
    },
}

impl<K> Assignment<K> {
    /// The assigned key, if the task landed in a key queue
    pub fn key(&self) -> Option<&K> {
        match self {
            Assignment::Key(key) => Some(key),
            Assignment::Global { .. } => None,
        }
    }

    /// Check if the task overflowed into the global queue
    pub fn is_global(&self) -> bool {
        matches!(self, Assignment::Global { .. })
    }
}

/// Trait for routing tasks across per-key queues
///
/// Every operation is atomic with respect to the others on the same
/// implementation. None of them wait for queue space: capacity-limited paths
/// fail with `QueueFull` instead.
#[async_trait]
pub trait KeyedQueue<T, K>: Send + Sync
where
    T: Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    /// Register a new, empty queue for `key`
    async fn add_key(&self, key: K) -> crate::Result<()>;

    /// Route a task with the active strategy, overflowing into the global queue
    async fn insert(&self, data: T) -> crate::Result<Assignment<K>>;

    /// Append a task to a specific key's queue
    async fn insert_by_key(&self, key: &K, data: T) -> crate::Result<()>;

    /// Remove the first task equal to `data` from `key`'s queue
    async fn delete(&self, key: &K, data: &T) -> crate::Result<()>;

    /// Remove a key, moving its pending tasks to the global queue tail
    async fn delete_key(&self, key: &K) -> crate::Result<()>;

    /// Snapshot of every key's queue length
    async fn processing_queue_lengths(&self) -> crate::Result<HashMap<K, usize>>;

    /// Move one task from `from_key`'s queue to the tail of `to_key`'s queue
    async fn transform_processing_data(&self, from_key: &K, to_key: &K, data: &T)
        -> crate::Result<()>;

    /// Move one task out of `from_key`'s queue to a key chosen by the strategy
    async fn auto_transform_processing_data(&self, from_key: &K, data: &T) -> crate::Result<K>;

    /// Position of the first task equal to `data` in the global queue
    async fn global_queue_position(&self, data: &T) -> crate::Result<Option<usize>>;

    /// Number of tasks waiting in the global queue
    async fn global_queue_len(&self) -> usize;

    /// Check if a key is registered
    async fn contains_key(&self, key: &K) -> bool;
}

//! Keyed Task Queue - an in-process router for tasks sharded by key
//!
//! This library assigns arbitrary task payloads to per-key bounded FIFO
//! queues using a pluggable load-balancing strategy, and parks tasks that no
//! key can accept in an unbounded global overflow queue.

/// Configuration management for the queue manager
pub mod config;
/// Queue manager and its builder
pub mod manager;
/// Queue contract and FIFO primitives
pub mod queue;
/// Key selection strategies
pub mod strategy;
/// Concrete task envelope
pub mod task;

pub use config::Config;
pub use manager::{AfterPushHook, QueueManager, QueueManagerBuilder};
pub use queue::{Assignment, KeyedQueue};
pub use strategy::{Least, RoundRobin, Strategy, StrategyKind};
pub use task::{Task, TaskPayload};

use thiserror::Error;

/// Result type for queue manager operations
pub type Result<T> = std::result::Result<T, TaskQueueError>;

/// Error types for the queue manager
#[derive(Error, Debug)]
pub enum TaskQueueError {
    /// A key with this name is already registered
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The operation referenced a key that is not registered
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// No task equal to the given one was found in the expected queue
    #[error("Task not found in {0}")]
    NotFound(String),

    /// The key queue is at capacity
    #[error("Queue for key {key} is full (capacity: {capacity})")]
    QueueFull {
        /// Key whose queue rejected the task
        key: String,
        /// Capacity of that queue
        capacity: usize,
    },

    /// The strategy could not find a destination key
    #[error("No eligible key: {0}")]
    NoEligibleKey(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl TaskQueueError {
    pub(crate) fn unknown_key<K: std::fmt::Debug>(key: &K) -> Self {
        TaskQueueError::UnknownKey(format!("{key:?}"))
    }

    pub(crate) fn queue_full<K: std::fmt::Debug>(key: &K, capacity: usize) -> Self {
        TaskQueueError::QueueFull {
            key: format!("{key:?}"),
            capacity,
        }
    }
}

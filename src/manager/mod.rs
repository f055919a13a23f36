//! Keyed queue manager
//!
//! [`QueueManager`] owns the registered keys, one bounded [`KeyQueue`] per key,
//! the unbounded [`GlobalQueue`], the active [`Strategy`] and the post-push
//! hooks. A single manager-wide lock guards all of it, so strategy selection
//! and the mutation it leads to are one atomic step.
//!
//! # Hooks
//!
//! Hooks run synchronously, in registration order, on the calling task and
//! while the manager lock is held, every time a task is appended to a key
//! queue. They must return quickly and must not block. Since they are plain
//! closures they cannot await the manager; work that needs the manager has to
//! be handed off (for example over a channel) and done after the hook
//! returns.

/// Builder for [`QueueManager`]
pub mod builder;

pub use builder::QueueManagerBuilder;

use crate::queue::global::GlobalQueue;
use crate::queue::key_queue::KeyQueue;
use crate::queue::{Assignment, KeyedQueue};
use crate::strategy::{SelectionContext, Strategy};
use crate::TaskQueueError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Callback invoked with `(key, task)` after a task is appended to a key queue
pub type AfterPushHook<K, T> = Arc<dyn Fn(&K, &T) + Send + Sync>;

/// Equality rule used to find a task in a queue
pub type Matcher<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Everything guarded by the manager lock
struct State<T, K> {
    /// Registration order, used for round-robin fairness
    ordered_keys: Vec<K>,
    queues: HashMap<K, KeyQueue<T>>,
    global: GlobalQueue<T>,
    /// Index into `ordered_keys` of the last assignment
    last_assigned: Option<usize>,
}

impl<T, K> State<T, K>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize, keys: Vec<K>) -> Self {
        let queues = keys
            .iter()
            .map(|key| (key.clone(), KeyQueue::new(capacity)))
            .collect();
        Self {
            ordered_keys: keys,
            queues,
            global: GlobalQueue::new(),
            last_assigned: None,
        }
    }
}

/// In-process router of tasks across per-key queues
pub struct QueueManager<T, K> {
    state: RwLock<State<T, K>>,
    strategy: Box<dyn Strategy<K, T>>,
    hooks: Vec<AfterPushHook<K, T>>,
    matcher: Matcher<T>,
    capacity: usize,
    exclude_source_on_auto_transform: bool,
}

impl<T, K> QueueManager<T, K>
where
    T: Send + Sync + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Start building a manager
    pub fn builder() -> QueueManagerBuilder<T, K> {
        QueueManagerBuilder::new()
    }

    /// Capacity of every key queue
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Name of the active strategy
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Registered keys in registration order
    pub async fn keys(&self) -> Vec<K> {
        self.state.read().await.ordered_keys.clone()
    }

    /// Remove the first task equal to `data` from the global queue
    pub async fn delete_global(&self, data: &T) -> crate::Result<()> {
        let mut state = self.state.write().await;
        match state.global.remove_first(|t| (self.matcher)(t, data)) {
            Some(_) => {
                debug!(remaining = state.global.len(), "Task removed from global queue");
                Ok(())
            }
            None => Err(TaskQueueError::NotFound("global queue".to_string())),
        }
    }

    /// Run the strategy over the current state. `leaving` names the key the
    /// task is taken from, which counts as having one more free slot.
    fn select(
        &self,
        state: &State<T, K>,
        exclude: Option<&K>,
        leaving: Option<&K>,
    ) -> Option<(usize, K)> {
        let mut ctx =
            SelectionContext::new(&state.ordered_keys, &state.queues, state.last_assigned);
        if let Some(key) = exclude {
            ctx = ctx.excluding(key);
        }
        if let Some(key) = leaving {
            ctx = ctx.releasing(key);
        }
        let index = self.strategy.select(&ctx)?;
        let key = state.ordered_keys.get(index)?.clone();
        Some((index, key))
    }

    /// Append to `key`'s queue and fire hooks. `selected` is the strategy's
    /// index when the push came from a selection; it advances the cursor.
    fn push_to(
        &self,
        state: &mut State<T, K>,
        selected: Option<usize>,
        key: &K,
        data: T,
    ) -> Result<(), T> {
        let Some(queue) = state.queues.get_mut(key) else {
            return Err(data);
        };
        queue.push(data)?;

        if let Some(index) = selected {
            state.last_assigned = Some(index);
        }
        if let Some(pushed) = queue.back() {
            for hook in &self.hooks {
                hook(key, pushed);
            }
        }
        Ok(())
    }

    fn require_key(&self, state: &State<T, K>, key: &K) -> crate::Result<()> {
        if state.queues.contains_key(key) {
            Ok(())
        } else {
            warn!(key = ?key, "Operation on unknown key");
            Err(TaskQueueError::unknown_key(key))
        }
    }
}

impl<T, K> QueueManager<T, K>
where
    T: Clone + Send + Sync + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Snapshot of `key`'s tasks, head first
    pub async fn processing_items(&self, key: &K) -> crate::Result<Vec<T>> {
        let state = self.state.read().await;
        state
            .queues
            .get(key)
            .map(|queue| queue.iter().cloned().collect())
            .ok_or_else(|| TaskQueueError::unknown_key(key))
    }

    /// Move tasks from the head of the global queue into key queues chosen by
    /// the strategy, until the global queue is empty or no key has room.
    ///
    /// Returns each drained task with the key it went to, in drain order.
    pub async fn drain_global(&self) -> Vec<(K, T)> {
        let mut state = self.state.write().await;
        let mut placed = Vec::new();

        while !state.global.is_empty() {
            let Some((index, key)) = self.select(&state, None, None) else {
                break;
            };
            let Some(task) = state.global.pop() else {
                break;
            };
            let moved = task.clone();
            if let Err(task) = self.push_to(&mut state, Some(index), &key, task) {
                state.global.push_front(task);
                break;
            }
            placed.push((key, moved));
        }

        if !placed.is_empty() {
            debug!(
                drained = placed.len(),
                remaining = state.global.len(),
                "Drained global queue"
            );
        }
        placed
    }
}

#[async_trait]
impl<T, K> KeyedQueue<T, K> for QueueManager<T, K>
where
    T: Send + Sync + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    async fn add_key(&self, key: K) -> crate::Result<()> {
        let mut state = self.state.write().await;
        if state.queues.contains_key(&key) {
            return Err(TaskQueueError::DuplicateKey(format!("{key:?}")));
        }

        state.queues.insert(key.clone(), KeyQueue::new(self.capacity));
        state.ordered_keys.push(key.clone());
        info!(key = ?key, keys = state.ordered_keys.len(), "Key registered");
        Ok(())
    }

    async fn insert(&self, data: T) -> crate::Result<Assignment<K>> {
        let mut state = self.state.write().await;

        let data = match self.select(&state, None, None) {
            Some((index, key)) => match self.push_to(&mut state, Some(index), &key, data) {
                Ok(()) => {
                    debug!(
                        key = ?key,
                        strategy = self.strategy.name(),
                        "Task assigned"
                    );
                    return Ok(Assignment::Key(key));
                }
                Err(data) => data,
            },
            None => data,
        };

        let position = state.global.push(data);
        warn!(
            position,
            keys = state.ordered_keys.len(),
            "No key can accept task, queued globally"
        );
        Ok(Assignment::Global { position })
    }

    async fn insert_by_key(&self, key: &K, data: T) -> crate::Result<()> {
        let mut state = self.state.write().await;
        self.require_key(&state, key)?;

        if self.push_to(&mut state, None, key, data).is_err() {
            warn!(key = ?key, capacity = self.capacity, "Key queue full");
            return Err(TaskQueueError::queue_full(key, self.capacity));
        }
        debug!(key = ?key, "Task inserted by key");
        Ok(())
    }

    async fn delete(&self, key: &K, data: &T) -> crate::Result<()> {
        let mut state = self.state.write().await;
        let queue = state
            .queues
            .get_mut(key)
            .ok_or_else(|| TaskQueueError::unknown_key(key))?;

        match queue.remove_first(|t| (self.matcher)(t, data)) {
            Some(_) => {
                debug!(key = ?key, remaining = queue.len(), "Task deleted");
                Ok(())
            }
            None => Err(TaskQueueError::NotFound(format!("queue {key:?}"))),
        }
    }

    async fn delete_key(&self, key: &K) -> crate::Result<()> {
        let mut state = self.state.write().await;
        let mut queue = state
            .queues
            .remove(key)
            .ok_or_else(|| TaskQueueError::unknown_key(key))?;

        let moved = queue.len();
        state.global.extend(queue.drain());

        if let Some(removed) = state.ordered_keys.iter().position(|k| k == key) {
            state.ordered_keys.remove(removed);
            // keep the next scan starting at the key that followed the removed one
            state.last_assigned = match state.last_assigned {
                _ if state.ordered_keys.is_empty() => None,
                Some(last) if last > removed => Some(last - 1),
                Some(last) if last == removed => removed.checked_sub(1),
                other => other,
            };
        }

        info!(key = ?key, moved, "Key removed, pending tasks moved to global queue");
        Ok(())
    }

    async fn processing_queue_lengths(&self) -> crate::Result<HashMap<K, usize>> {
        let state = self.state.read().await;
        Ok(state
            .queues
            .iter()
            .map(|(key, queue)| (key.clone(), queue.len()))
            .collect())
    }

    async fn transform_processing_data(
        &self,
        from_key: &K,
        to_key: &K,
        data: &T,
    ) -> crate::Result<()> {
        let mut state = self.state.write().await;
        self.require_key(&state, from_key)?;
        self.require_key(&state, to_key)?;

        let matches = |t: &T| (self.matcher)(t, data);
        let found = state
            .queues
            .get(from_key)
            .and_then(|queue| queue.position(matches));
        if found.is_none() {
            return Err(TaskQueueError::NotFound(format!("queue {from_key:?}")));
        }

        if from_key != to_key && state.queues.get(to_key).is_some_and(KeyQueue::is_full) {
            warn!(from = ?from_key, to = ?to_key, "Transform rejected, destination full");
            return Err(TaskQueueError::queue_full(to_key, self.capacity));
        }

        let task = state
            .queues
            .get_mut(from_key)
            .and_then(|queue| queue.remove_first(matches))
            .ok_or_else(|| TaskQueueError::NotFound(format!("queue {from_key:?}")))?;
        if self.push_to(&mut state, None, to_key, task).is_err() {
            return Err(TaskQueueError::queue_full(to_key, self.capacity));
        }

        debug!(from = ?from_key, to = ?to_key, "Task transferred");
        Ok(())
    }

    async fn auto_transform_processing_data(&self, from_key: &K, data: &T) -> crate::Result<K> {
        let mut state = self.state.write().await;
        self.require_key(&state, from_key)?;

        let matches = |t: &T| (self.matcher)(t, data);
        let found = state
            .queues
            .get(from_key)
            .and_then(|queue| queue.position(matches));
        if found.is_none() {
            return Err(TaskQueueError::NotFound(format!("queue {from_key:?}")));
        }

        let exclude = self.exclude_source_on_auto_transform.then_some(from_key);
        let Some((index, to_key)) = self.select(&state, exclude, Some(from_key)) else {
            warn!(from = ?from_key, strategy = self.strategy.name(), "No destination for task");
            return Err(TaskQueueError::NoEligibleKey(format!(
                "no queue can accept a task from {from_key:?}"
            )));
        };

        let task = state
            .queues
            .get_mut(from_key)
            .and_then(|queue| queue.remove_first(matches))
            .ok_or_else(|| TaskQueueError::NotFound(format!("queue {from_key:?}")))?;
        if self.push_to(&mut state, Some(index), &to_key, task).is_err() {
            return Err(TaskQueueError::queue_full(&to_key, self.capacity));
        }

        debug!(from = ?from_key, to = ?to_key, strategy = self.strategy.name(), "Task rebalanced");
        Ok(to_key)
    }

    async fn global_queue_position(&self, data: &T) -> crate::Result<Option<usize>> {
        let state = self.state.read().await;
        Ok(state.global.position(|t| (self.matcher)(t, data)))
    }

    async fn global_queue_len(&self) -> usize {
        self.state.read().await.global.len()
    }

    async fn contains_key(&self, key: &K) -> bool {
        self.state.read().await.queues.contains_key(key)
    }
}

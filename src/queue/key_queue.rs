//! Bounded per-key FIFO

use std::collections::VecDeque;

/// FIFO holding the tasks currently assigned to one key.
///
/// `len() <= capacity()` always holds: `push` hands the task back instead of
/// growing past the bound.
#[derive(Debug, Clone)]
pub struct KeyQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> KeyQueue<T> {
    /// Create an empty queue bounded to `capacity` tasks
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Number of tasks in the queue
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if the queue is at capacity
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Maximum number of tasks the queue holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a task at the tail, returning it back if the queue is full
    pub fn push(&mut self, task: T) -> Result<(), T> {
        if self.is_full() {
            return Err(task);
        }
        self.items.push_back(task);
        Ok(())
    }

    /// Task at the tail
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Index of the first task matching `pred`
    pub fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        self.items.iter().position(pred)
    }

    /// Remove the first task matching `pred`, keeping the order of the rest
    pub fn remove_first<F>(&mut self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.position(pred)?;
        self.items.remove(index)
    }

    /// Iterate over tasks head to tail
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Take every task out, head first
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..)
    }
}

//! Unbounded overflow FIFO

use std::collections::VecDeque;

/// FIFO for tasks that no key queue could accept at insertion time
#[derive(Debug, Clone)]
pub struct GlobalQueue<T> {
    items: VecDeque<T>,
}

impl<T> GlobalQueue<T> {
    /// Create an empty global queue
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Number of tasks waiting
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no tasks are waiting
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a task at the tail and return its index
    pub fn push(&mut self, task: T) -> usize {
        self.items.push_back(task);
        self.items.len() - 1
    }

    /// Put a task back at the head
    pub fn push_front(&mut self, task: T) {
        self.items.push_front(task);
    }

    /// Take the task at the head
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Append tasks at the tail, preserving their order
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, tasks: I) {
        self.items.extend(tasks);
    }

    /// Index of the first task matching `pred`
    pub fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        self.items.iter().position(pred)
    }

    /// Remove the first task matching `pred`
    pub fn remove_first<F>(&mut self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.position(pred)?;
        self.items.remove(index)
    }
}

impl<T> Default for GlobalQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

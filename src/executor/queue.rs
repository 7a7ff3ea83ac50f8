//! Bounded Task Queue
//!
//! A FIFO of pending tasks with a fixed capacity. Producers never block: a push
//! onto a full queue is rejected and counted instead of buffered.
//!
//! ## Overflow accounting
//! - `missing_tasks`: number of rejected pushes since the last `clear()`.
//! - `first_overflow_ms`: wall-clock time of the first rejection since the last `clear()`.
//!   Later rejections leave it untouched.

use super::types::{Task, now_ms};

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Capacity used by pools that do not configure one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

/// Point-in-time view of a queue, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueStats {
    pub len: usize,
    pub capacity: usize,
    pub missing_tasks: u64,
    pub first_overflow_ms: Option<u64>,
}

struct QueueInner<T> {
    tasks: VecDeque<Task<T>>,
    missing_tasks: u64,
    first_overflow_ms: Option<u64>,
}

pub struct TaskQueue<T> {
    capacity: usize,
    inner: Mutex<QueueInner<T>>,
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(QueueInner {
                tasks: VecDeque::with_capacity(capacity),
                missing_tasks: 0,
                first_overflow_ms: None,
            }),
        }
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, QueueInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    /// Drops every pending task without running it and resets the overflow counters.
    pub fn clear(&self) {
        let mut inner = self.lock();
        let dropped = inner.tasks.len();
        inner.tasks.clear();
        inner.missing_tasks = 0;
        inner.first_overflow_ms = None;

        if dropped > 0 {
            tracing::debug!("Cleared {} pending tasks", dropped);
        }
    }

    /// Removes and returns the oldest task, or `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<Task<T>> {
        self.lock().tasks.pop_front()
    }

    /// Appends `task` if there is room.
    ///
    /// Returns `false` when the queue is at capacity. The rejected task is dropped
    /// and only the overflow counters remember it.
    pub fn try_push(&self, task: Task<T>) -> bool {
        let mut inner = self.lock();

        if inner.tasks.len() >= self.capacity {
            inner.missing_tasks += 1;

            if inner.first_overflow_ms.is_none() {
                inner.first_overflow_ms = Some(now_ms());
                tracing::warn!(
                    "Task queue full (capacity {}), dropping task {}",
                    self.capacity,
                    task.id
                );
            } else {
                tracing::warn!(
                    "Task queue still full, dropping task {} ({} dropped so far)",
                    task.id,
                    inner.missing_tasks
                );
            }
            return false;
        }

        inner.tasks.push_back(task);
        true
    }

    pub fn missing_tasks(&self) -> u64 {
        self.lock().missing_tasks
    }

    pub fn first_overflow_ms(&self) -> Option<u64> {
        self.lock().first_overflow_ms
    }

    pub fn stats(&self) -> QueueStats {
        let inner = self.lock();
        QueueStats {
            len: inner.tasks.len(),
            capacity: self.capacity,
            missing_tasks: inner.missing_tasks,
            first_overflow_ms: inner.first_overflow_ms,
        }
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

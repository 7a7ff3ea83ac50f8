//! Task Status Registry
//!
//! Records what happened to every task a pool issued an id for, so callers can
//! look up the outcome of fire-and-forget submissions by `TaskId`.

use super::types::*;

use dashmap::DashMap;

/// Above this many entries, finished tasks are evicted on the next insert.
const MAX_TRACKED_TASKS: usize = 10_000;

pub struct TaskRegistry {
    statuses: DashMap<TaskId, TaskStatus>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            statuses: DashMap::new(),
        }
    }

    /// Sets the status of `task_id`, inserting it if unknown.
    pub fn record(&self, task_id: TaskId, status: TaskStatus) {
        if self.statuses.len() >= MAX_TRACKED_TASKS && !self.statuses.contains_key(&task_id) {
            self.evict_finished();
        }

        tracing::trace!("Task {} -> {:?}", task_id, status);
        self.statuses.insert(task_id, status);
    }

    pub fn status(&self, task_id: TaskId) -> Option<TaskStatus> {
        self.statuses.get(&task_id).map(|entry| entry.value().clone())
    }

    pub fn tracked_count(&self) -> usize {
        self.statuses.len()
    }

    fn evict_finished(&self) {
        let before = self.statuses.len();
        self.statuses.retain(|_, status| !status.is_finished());
        tracing::debug!(
            "Evicted {} finished task statuses",
            before - self.statuses.len()
        );
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

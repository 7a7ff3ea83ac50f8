use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier issued by a `WorkerPool` at submission time.
///
/// Ids start at 1 and are strictly increasing per pool. They are never reused,
/// including for submissions the queue rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents the lifecycle state of a submitted task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaskStatus {
    /// Accepted by the queue, waiting for a worker.
    Queued,
    /// Rejected because the queue was full. The task will never run.
    Dropped,
    /// Currently being processed by a worker.
    Running,
    /// Handler returned `Ok`.
    Completed,
    /// Handler returned an `Err` or panicked.
    Failed { error: String },
}

impl TaskStatus {
    /// True once the status can no longer change.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Dropped | TaskStatus::Completed | TaskStatus::Failed { .. }
        )
    }
}

/// A unit of deferred work: the issued id plus the payload the pool's handler consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task<T> {
    pub id: TaskId,
    pub payload: T,
}

impl<T> Task<T> {
    pub fn new(id: TaskId, payload: T) -> Self {
        Self { id, payload }
    }
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

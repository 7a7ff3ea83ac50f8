//! Worker Pool Implementation
//!
//! Runs a fixed number of tokio workers that consume a shared `TaskQueue`.
//!
//! ## Lifecycle
//! - **initialize**: stops and joins the previous generation of workers (if any), then
//!   spawns a fresh one. Two generations never run at the same time.
//! - **terminate**: graceful drain. Workers keep popping until the queue is empty, then exit;
//!   the call returns once every worker has been joined.
//! - **pause / resume**: cooperative and non-blocking. Paused workers stop dequeuing and
//!   wait; tasks keep accumulating in the queue until `resume`.
//!
//! ## Execution
//! Each task runs in its own spawned tokio task, so an `Err` or a panic in a handler is
//! recorded in the `TaskRegistry` and logged without taking the worker down.

use super::queue::{DEFAULT_QUEUE_CAPACITY, QueueStats, TaskQueue};
use super::registry::TaskRegistry;
use super::types::*;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Type alias for the type-erased handler every worker invokes with a task payload.
pub type TaskHandlerFn<T> =
    Arc<dyn Fn(T) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

/// Lifecycle of a pool. Exactly one state holds at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PoolState {
    /// No workers. Submitted tasks wait in the queue.
    Uninitialized,
    /// Workers are dequeuing and executing.
    Running,
    /// Workers are alive but do not dequeue.
    Paused,
    /// Terminate in progress: workers drain the queue and exit.
    Draining,
}

#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of workers started by `start()`.
    pub worker_count: usize,
    /// Capacity of the pool's `TaskQueue`.
    pub queue_capacity: usize,
    /// Pause applied by a worker after each task. Zero in production; tests use it to
    /// hold tasks in the queue deterministically.
    pub task_delay: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 6,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            task_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolStats {
    pub name: String,
    pub state: PoolState,
    pub worker_count: usize,
    pub last_task_id: u64,
    pub queue: QueueStats,
}

enum Step<T> {
    Run(Task<T>),
    Wait,
    Exit,
}

/// State shared between the pool handle and its workers.
struct PoolShared<T> {
    name: String,
    queue: TaskQueue<T>,
    state: Mutex<PoolState>,
    /// Last issued id. Held across the push so queue order matches id order.
    last_id: Mutex<u64>,
    wakeup: Notify,
    registry: TaskRegistry,
    handler: TaskHandlerFn<T>,
    task_delay: Duration,
}

impl<T> PoolShared<T> {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> PoolState {
        *self.lock_state()
    }

    fn set_state(&self, state: PoolState) {
        *self.lock_state() = state;
    }

    /// Moves `from -> to` atomically. Returns `false` if the pool was not in `from`.
    fn transition(&self, from: PoolState, to: PoolState) -> bool {
        let mut state = self.lock_state();
        if *state != from {
            return false;
        }
        *state = to;
        true
    }

    fn next_step(&self) -> Step<T> {
        let state = self.lock_state();
        match *state {
            PoolState::Running => self.queue.try_pop().map_or(Step::Wait, Step::Run),
            PoolState::Draining => self.queue.try_pop().map_or(Step::Exit, Step::Run),
            PoolState::Paused | PoolState::Uninitialized => Step::Wait,
        }
    }
}

impl<T: Send + 'static> PoolShared<T> {
    async fn worker_loop(self: Arc<Self>, worker_id: usize) {
        tracing::debug!("Worker {} of pool '{}' started", worker_id, self.name);

        loop {
            let task = {
                // Register for wakeups before inspecting state so a notify issued
                // between the check and the await is not lost. The registration
                // must not outlive this block: a busy worker left in the waiter
                // list would absorb `notify_one` meant for an idle one.
                let notified = self.wakeup.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();

                match self.next_step() {
                    Step::Run(task) => task,
                    Step::Wait => {
                        notified.await;
                        continue;
                    }
                    Step::Exit => break,
                }
            };

            self.execute(worker_id, task).await;
        }

        tracing::debug!("Worker {} of pool '{}' exited", worker_id, self.name);
    }

    async fn execute(&self, worker_id: usize, task: Task<T>) {
        let Task { id, payload } = task;
        self.registry.record(id, TaskStatus::Running);
        tracing::debug!("Worker {} of pool '{}' running task {}", worker_id, self.name, id);

        let handler = self.handler.clone();
        let outcome = tokio::spawn(async move { handler(payload).await }).await;

        let status = match outcome {
            Ok(Ok(())) => TaskStatus::Completed,
            Ok(Err(e)) => {
                tracing::error!("Task {} in pool '{}' failed: {:#}", id, self.name, e);
                TaskStatus::Failed {
                    error: e.to_string(),
                }
            }
            Err(join_error) => {
                tracing::error!(
                    "Task {} in pool '{}' panicked: {}",
                    id,
                    self.name,
                    join_error
                );
                TaskStatus::Failed {
                    error: join_error.to_string(),
                }
            }
        };
        self.registry.record(id, status);

        if !self.task_delay.is_zero() {
            tokio::time::sleep(self.task_delay).await;
        }
    }
}

/// A fixed-size set of workers consuming one bounded queue.
pub struct WorkerPool<T> {
    shared: Arc<PoolShared<T>>,
    config: WorkerPoolConfig,
    /// Join handles of the live generation. Also serializes initialize/terminate.
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    worker_count: AtomicUsize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates an uninitialized pool. Call `start()` or `initialize()` to spawn workers.
    ///
    /// # Arguments
    /// * `name` - Used in log lines and stats.
    /// * `handler` - Invoked once per dequeued task payload.
    pub fn new<F, Fut>(name: &str, config: WorkerPoolConfig, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler_fn: TaskHandlerFn<T> = Arc::new(move |payload: T| {
            Box::pin(handler(payload)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        });

        Self {
            shared: Arc::new(PoolShared {
                name: name.to_string(),
                queue: TaskQueue::with_capacity(config.queue_capacity),
                state: Mutex::new(PoolState::Uninitialized),
                last_id: Mutex::new(0),
                wakeup: Notify::new(),
                registry: TaskRegistry::new(),
                handler: handler_fn,
                task_delay: config.task_delay,
            }),
            config,
            workers: tokio::sync::Mutex::new(Vec::new()),
            worker_count: AtomicUsize::new(0),
        }
    }

    /// Initializes the pool with the configured worker count.
    pub async fn start(&self) {
        self.initialize(self.config.worker_count).await;
    }

    /// Spawns `worker_count` workers, first terminating and joining any previous generation.
    pub async fn initialize(&self, worker_count: usize) {
        let mut workers = self.workers.lock().await;

        if self.shared.state() != PoolState::Uninitialized {
            tracing::info!(
                "Re-initializing pool '{}', stopping previous workers",
                self.shared.name
            );
            self.drain_and_join(&mut workers).await;
        }

        self.shared.set_state(PoolState::Running);
        for worker_id in 0..worker_count {
            let shared = self.shared.clone();
            workers.push(tokio::spawn(shared.worker_loop(worker_id)));
        }
        self.worker_count.store(worker_count, Ordering::SeqCst);

        tracing::info!(
            "Worker pool '{}' started with {} workers",
            self.shared.name,
            worker_count
        );
    }

    /// Drains the queue and joins every worker. No-op if the pool is not initialized.
    ///
    /// Tasks enqueued before this call all run before it returns.
    pub async fn terminate(&self) {
        let mut workers = self.workers.lock().await;

        if self.shared.state() == PoolState::Uninitialized {
            return;
        }

        tracing::info!(
            "Terminating pool '{}' ({} tasks pending)",
            self.shared.name,
            self.shared.queue.len()
        );
        self.drain_and_join(&mut workers).await;
        tracing::info!("Worker pool '{}' terminated", self.shared.name);
    }

    async fn drain_and_join(&self, workers: &mut Vec<JoinHandle<()>>) {
        self.shared.set_state(PoolState::Draining);
        self.shared.wakeup.notify_waiters();

        for handle in workers.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!("Worker of pool '{}' did not exit cleanly: {}", self.shared.name, e);
            }
        }

        self.worker_count.store(0, Ordering::SeqCst);
        self.shared.set_state(PoolState::Uninitialized);
    }

    /// Submits `payload` and returns its id.
    ///
    /// The id is returned whether or not the queue accepted the task; use
    /// `task_status` or the queue's overflow counters to detect drops.
    pub fn add_task(&self, payload: T) -> TaskId {
        let mut last_id = self
            .shared
            .last_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last_id += 1;
        let task_id = TaskId(*last_id);

        // Recorded before the push so a worker's Running can never be overwritten.
        self.shared.registry.record(task_id, TaskStatus::Queued);

        if self.shared.queue.try_push(Task::new(task_id, payload)) {
            self.shared.wakeup.notify_one();
        } else {
            self.shared.registry.record(task_id, TaskStatus::Dropped);
        }

        task_id
    }
}

impl<T> WorkerPool<T> {
    /// Stops workers from dequeuing. Returns `false` unless the pool was running.
    pub fn pause(&self) -> bool {
        let changed = self
            .shared
            .transition(PoolState::Running, PoolState::Paused);
        if changed {
            tracing::info!("Worker pool '{}' paused", self.shared.name);
        }
        changed
    }

    /// Lets paused workers dequeue again. Returns `false` unless the pool was paused.
    pub fn resume(&self) -> bool {
        let changed = self
            .shared
            .transition(PoolState::Paused, PoolState::Running);
        if changed {
            self.shared.wakeup.notify_waiters();
            tracing::info!("Worker pool '{}' resumed", self.shared.name);
        }
        changed
    }

    /// True while the pool is initialized and not terminating.
    pub fn working(&self) -> bool {
        matches!(
            self.shared.state(),
            PoolState::Running | PoolState::Paused
        )
    }

    pub fn state(&self) -> PoolState {
        self.shared.state()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn queue(&self) -> &TaskQueue<T> {
        &self.shared.queue
    }

    pub fn task_status(&self, task_id: TaskId) -> Option<TaskStatus> {
        self.shared.registry.status(task_id)
    }

    pub fn last_task_id(&self) -> TaskId {
        TaskId(*self.shared.last_id.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            name: self.shared.name.clone(),
            state: self.shared.state(),
            worker_count: self.worker_count.load(Ordering::SeqCst),
            last_task_id: self.last_task_id().0,
            queue: self.shared.queue.stats(),
        }
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        // Workers own a clone of the shared state; tell them to drain and exit.
        let mut state = self.shared.lock_state();
        if matches!(*state, PoolState::Running | PoolState::Paused) {
            *state = PoolState::Draining;
            drop(state);
            self.shared.wakeup.notify_waiters();
        }
    }
}

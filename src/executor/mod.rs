//! Task Executor Module
//!
//! The concurrency engine behind the server: a bounded task queue with overflow
//! accounting and a worker pool with a cooperative lifecycle.
//!
//! ## Architecture Overview
//! 1. **Submission**: `WorkerPool::add_task` issues a `TaskId` and pushes the task onto the
//!    pool's `TaskQueue`. A full queue rejects the task; nothing blocks the producer.
//! 2. **Execution**: Worker tasks wait for work, pop in FIFO order and invoke the pool's handler.
//! 3. **Tracking**: Every issued id gets a `TaskStatus` in the `TaskRegistry`, updated by the
//!    submitter (`Queued` / `Dropped`) and by the executing worker (`Running` / `Completed` / `Failed`).
//!
//! ## Submodules
//! - **`types`**: Task ids, statuses and the task envelope.
//! - **`queue`**: The bounded FIFO with overflow statistics.
//! - **`pool`**: Worker lifecycle (initialize / terminate / pause / resume) and the worker loop.
//! - **`registry`**: Per-task status lookup.

pub mod pool;
pub mod queue;
pub mod registry;
pub mod types;

//! Document Indexing Server Library
//!
//! Clients submit, delete and search text documents over a line-based TCP protocol.
//! Documents are persisted to disk synchronously; the searchable index is updated
//! asynchronously by a bounded worker pool, so searches are eventually consistent with
//! storage.
//!
//! ## Architecture Modules
//! - **`executor`**: The concurrency engine. A bounded `TaskQueue` that rejects and counts
//!   overflow, and a `WorkerPool` with initialize / terminate / pause / resume.
//! - **`search`**: The thread-safe `InvertedIndex` (term -> filename postings) and the
//!   `IndexTask` mutations applied to it.
//! - **`storage`**: `FileStorage`, the on-disk document directory.
//! - **`server`**: Line protocol, per-command `Dispatcher` and the TCP front end, which uses a
//!   second `WorkerPool` to bound concurrent connections.
//! - **`client`**: Helpers for talking to a running server.
//! - **`config`**: Server settings from flags and environment.

pub mod client;
pub mod config;
pub mod executor;
pub mod search;
pub mod server;
pub mod storage;

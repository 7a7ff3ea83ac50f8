//! Server Module
//!
//! The network-facing half of the service.
//!
//! ## Request Flow
//! 1. **Accept**: `IndexServer` accepts a socket and queues it on the connection pool.
//! 2. **Dispatch**: A connection worker reads one line and passes it to the `Dispatcher`.
//! 3. **Mutate / Read**: The dispatcher updates storage inline and defers index updates to
//!    the index pool, or reads the index directly for searches and counts.
//! 4. **Reply**: The reply is written and the connection closed.
//!
//! ## Submodules
//! - **`protocol`**: Command parsing and reply encoding.
//! - **`dispatcher`**: Per-command handling.
//! - **`listener`**: Accept loop, connection handling and shutdown.

pub mod dispatcher;
pub mod listener;
pub mod protocol;

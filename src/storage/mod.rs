//! Document Storage Module
//!
//! On-disk persistence for submitted documents. This is the only durable state the
//! server has: the inverted index and task queues live in memory and start empty.
//!
//! - **`files`**: `FileStorage`, a flat directory with write / delete / read / list.

pub mod files;

#[cfg(test)]
mod tests;

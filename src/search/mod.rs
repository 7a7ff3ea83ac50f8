//! Search Module
//!
//! The thread-safe inverted index the server answers `SEARCH` and `CHECK_INDEX` from,
//! and the task type that mutates it asynchronously.
//!
//! ## Submodules
//! - **`index`**: Term -> filename posting lists plus the indexed-files counter.
//! - **`tokenizer`**: Whitespace tokenization of document content.
//! - **`types`**: `IndexTask`, the tagged add/delete mutation applied by index workers.

pub mod index;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod tests;

//! In-memory inverted index.
//!
//! Maps each term to a posting list of filenames with one entry per occurrence, so
//! term frequency is encoded by repetition. A single mutex guards the whole index:
//! readers never observe a partially applied add or delete.

use super::tokenizer::tokenize_document;
use super::types::IndexTask;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct IndexInner {
    postings: HashMap<String, Vec<String>>,
    indexed_files: i64,
}

#[derive(Default)]
pub struct InvertedIndex {
    inner: Mutex<IndexInner>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `filename` to the posting list of every term in `content`, once per
    /// occurrence, and counts one more indexed file.
    ///
    /// Adding the same filename twice keeps the postings of both calls.
    pub fn add_file(&self, filename: &str, content: &str) {
        let mut inner = self.lock();
        let mut terms = 0usize;

        for term in tokenize_document(content) {
            inner
                .postings
                .entry(term.to_string())
                .or_default()
                .push(filename.to_string());
            terms += 1;
        }
        inner.indexed_files += 1;

        tracing::debug!("Indexed {} ({} terms)", filename, terms);
    }

    /// Removes every posting of `filename` and counts one less indexed file.
    ///
    /// The counter is decremented even when `filename` had no postings.
    pub fn delete_file(&self, filename: &str) {
        let mut inner = self.lock();
        let mut removed = 0usize;

        inner.postings.retain(|_, files| {
            let before = files.len();
            files.retain(|f| f != filename);
            removed += before - files.len();
            !files.is_empty()
        });
        inner.indexed_files -= 1;

        tracing::debug!("Removed {} from index ({} postings)", filename, removed);
    }

    /// Returns the posting list of `term` (exact match), or an empty list.
    pub fn search(&self, term: &str) -> Vec<String> {
        self.lock().postings.get(term).cloned().unwrap_or_default()
    }

    /// Number of add calls minus number of delete calls applied so far.
    pub fn indexed_files_count(&self) -> i64 {
        self.lock().indexed_files
    }

    /// Number of distinct terms with at least one posting.
    pub fn term_count(&self) -> usize {
        self.lock().postings.len()
    }

    pub fn apply(&self, task: IndexTask) {
        match task {
            IndexTask::Add { filename, content } => self.add_file(&filename, &content),
            IndexTask::Delete { filename } => self.delete_file(&filename),
        }
    }
}

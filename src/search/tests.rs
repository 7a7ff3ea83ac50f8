//! Search Module Tests
//!
//! Validates tokenization and the inverted index semantics.
//!
//! ## Test Scopes
//! - **Tokenizer**: Whitespace splitting with case and punctuation preserved.
//! - **Index**: Occurrence-based postings, deletes, counter behaviour and read purity.
//! - **Concurrency**: Parallel adds through a worker pool.

#[cfg(test)]
mod tests {
    use crate::executor::pool::{WorkerPool, WorkerPoolConfig};
    use crate::search::index::InvertedIndex;
    use crate::search::tokenizer::tokenize_document;
    use crate::search::types::IndexTask;
    use std::sync::Arc;

    // ============================================================
    // TOKENIZER TESTS
    // ============================================================

    #[test]
    fn test_tokenize_document_splits_on_whitespace() {
        let tokens: Vec<&str> = tokenize_document("foo  bar\tbaz\nqux").collect();
        assert_eq!(tokens, vec!["foo", "bar", "baz", "qux"]);
    }

    #[test]
    fn test_tokenize_document_preserves_case_and_duplicates() {
        let tokens: Vec<&str> = tokenize_document("Rust rust, RUST rust").collect();
        assert_eq!(tokens, vec!["Rust", "rust,", "RUST", "rust"]);
    }

    #[test]
    fn test_tokenize_document_empty() {
        assert_eq!(tokenize_document("   ").count(), 0);
        assert_eq!(tokenize_document("").count(), 0);
    }

    // ============================================================
    // INDEX TESTS - add / search
    // ============================================================

    #[test]
    fn test_search_returns_one_posting_per_occurrence() {
        let index = InvertedIndex::new();
        index.add_file("a", "foo bar foo");

        assert_eq!(index.search("foo"), vec!["a", "a"]);
        assert_eq!(index.search("bar"), vec!["a"]);
        assert!(index.search("baz").is_empty());
        assert_eq!(index.indexed_files_count(), 1);
    }

    #[test]
    fn test_search_is_exact_match() {
        let index = InvertedIndex::new();
        index.add_file("a", "Program programs");

        assert_eq!(index.search("Program"), vec!["a"]);
        assert!(index.search("program").is_empty());
        assert!(index.search("prog").is_empty());
    }

    #[test]
    fn test_postings_keep_insertion_order_across_files() {
        let index = InvertedIndex::new();
        index.add_file("first", "shared");
        index.add_file("second", "shared shared");
        index.add_file("third", "shared");

        assert_eq!(
            index.search("shared"),
            vec!["first", "second", "second", "third"]
        );
    }

    #[test]
    fn test_re_adding_same_file_duplicates_postings() {
        let index = InvertedIndex::new();
        index.add_file("a", "foo bar");
        index.add_file("a", "foo");

        assert_eq!(index.search("foo"), vec!["a", "a"]);
        assert_eq!(index.search("bar"), vec!["a"]);
        assert_eq!(index.indexed_files_count(), 2);
    }

    #[test]
    fn test_add_empty_content_still_counts_file() {
        let index = InvertedIndex::new();
        index.add_file("empty", "");

        assert_eq!(index.indexed_files_count(), 1);
        assert_eq!(index.term_count(), 0);
    }

    // ============================================================
    // INDEX TESTS - delete
    // ============================================================

    #[test]
    fn test_delete_removes_all_postings_and_decrements_once() {
        let index = InvertedIndex::new();
        index.add_file("a", "foo bar foo baz");
        index.add_file("b", "foo");
        assert_eq!(index.indexed_files_count(), 2);

        index.delete_file("a");

        assert_eq!(index.search("foo"), vec!["b"]);
        assert!(index.search("bar").is_empty());
        assert!(index.search("baz").is_empty());
        assert_eq!(index.indexed_files_count(), 1);
        assert_eq!(index.term_count(), 1);
    }

    #[test]
    fn test_delete_preserves_order_of_remaining_postings() {
        let index = InvertedIndex::new();
        index.add_file("x", "term");
        index.add_file("y", "term");
        index.add_file("z", "term");

        index.delete_file("y");

        assert_eq!(index.search("term"), vec!["x", "z"]);
    }

    #[test]
    fn test_delete_unknown_file_still_decrements_counter() {
        let index = InvertedIndex::new();
        index.add_file("a", "foo");

        index.delete_file("never-added");

        assert_eq!(index.search("foo"), vec!["a"]);
        assert_eq!(index.indexed_files_count(), 0);

        index.delete_file("never-added");
        assert_eq!(index.indexed_files_count(), -1);
    }

    // ============================================================
    // INDEX TESTS - read purity and task dispatch
    // ============================================================

    #[test]
    fn test_search_does_not_mutate_index() {
        let index = InvertedIndex::new();
        index.add_file("a", "foo bar foo");

        for _ in 0..3 {
            index.search("foo");
            index.search("missing");
        }

        assert_eq!(index.indexed_files_count(), 1);
        assert_eq!(index.term_count(), 2);
        assert_eq!(index.search("foo"), vec!["a", "a"]);
    }

    #[test]
    fn test_apply_dispatches_index_tasks() {
        let index = InvertedIndex::new();

        index.apply(IndexTask::Add {
            filename: "doc.txt".to_string(),
            content: "hello world".to_string(),
        });
        assert_eq!(index.search("hello"), vec!["doc.txt"]);

        index.apply(IndexTask::Delete {
            filename: "doc.txt".to_string(),
        });
        assert!(index.search("hello").is_empty());
        assert_eq!(index.indexed_files_count(), 0);
    }

    #[test]
    fn test_index_task_serialization() {
        let task = IndexTask::Add {
            filename: "a.txt".to_string(),
            content: "foo bar".to_string(),
        };

        let json = serde_json::to_value(&task).expect("Serialization failed");
        assert_eq!(json["op"], "add");
        assert_eq!(json["filename"], "a.txt");

        let restored: IndexTask = serde_json::from_value(json).expect("Deserialization failed");
        assert_eq!(restored, task);
        assert_eq!(restored.filename(), "a.txt");
    }

    // ============================================================
    // CONCURRENCY TESTS
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_converge_to_exact_count() {
        // ARRANGE
        let index = Arc::new(InvertedIndex::new());
        let index_clone = index.clone();
        let pool = WorkerPool::new(
            "index",
            WorkerPoolConfig {
                worker_count: 4,
                queue_capacity: 100,
                ..WorkerPoolConfig::default()
            },
            move |task: IndexTask| {
                let index = index_clone.clone();
                async move {
                    index.apply(task);
                    Ok(())
                }
            },
        );
        pool.start().await;

        // ACT: M distinct adds
        let m = 50;
        for i in 0..m {
            pool.add_task(IndexTask::Add {
                filename: format!("file-{}", i),
                content: "common unique".to_string(),
            });
        }

        // ASSERT: Polled counter is monotonic and never exceeds M
        let mut last_seen = 0;
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let count = index.indexed_files_count();
            assert!(count >= last_seen, "Counter went backwards");
            assert!(count <= m, "Counter exceeded submitted adds");
            last_seen = count;
            if count == m {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "Adds did not converge");
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(index.search("common").len(), m as usize);
        pool.terminate().await;
    }
}

//! Storage Module Tests
//!
//! Validates the file-backed document store against a temporary directory.
//!
//! ## Test Scopes
//! - **Lifecycle**: Directory creation, write / read / overwrite / delete.
//! - **Safety**: Names that would escape the storage directory are rejected.
//! - **Listing**: Only regular files are reported, in sorted order.

#[cfg(test)]
mod tests {
    use crate::storage::files::FileStorage;

    // ============================================================
    // LIFECYCLE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("nested").join("server_files");

        let storage = FileStorage::new(&base).await.expect("Storage should open");

        assert!(base.is_dir());
        assert_eq!(storage.base_dir(), base.as_path());
    }

    #[tokio::test]
    async fn test_write_read_and_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path()).await.unwrap();

        storage.write("doc.txt", "first version").await.unwrap();
        assert_eq!(storage.read("doc.txt").await.unwrap(), "first version");

        storage.write("doc.txt", "second").await.unwrap();
        assert_eq!(storage.read("doc.txt").await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path()).await.unwrap();
        storage.write("doc.txt", "content").await.unwrap();

        storage.delete("doc.txt").await.unwrap();

        assert!(!tmp.path().join("doc.txt").exists());
        assert!(storage.read("doc.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path()).await.unwrap();

        let result = storage.delete("missing.txt").await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to delete"));
    }

    // ============================================================
    // SAFETY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_rejects_names_outside_base_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("store")).await.unwrap();

        for name in ["", ".", "..", "../escape.txt", "sub/doc.txt", "a\\b"] {
            let result = storage.write(name, "content").await;
            assert!(result.is_err(), "Name {:?} should be rejected", name);
        }

        assert!(!tmp.path().join("escape.txt").exists());
    }

    // ============================================================
    // LISTING TESTS
    // ============================================================

    #[tokio::test]
    async fn test_list_returns_sorted_regular_files() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path()).await.unwrap();
        storage.write("b.txt", "b").await.unwrap();
        storage.write("a.txt", "a").await.unwrap();
        std::fs::create_dir(tmp.path().join("subdir")).unwrap();

        let names = storage.list().await.unwrap();

        assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }
}

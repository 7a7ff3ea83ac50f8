use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Flat directory of documents, one file per filename.
///
/// Every operation resolves `filename` inside `base_dir`; names that would escape it
/// are rejected.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Opens storage rooted at `base_dir`, creating the directory if absent.
    pub async fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        tokio::fs::create_dir_all(&base_dir)
            .await
            .with_context(|| format!("Failed to create storage dir {}", base_dir.display()))?;

        tracing::info!("Using storage directory {}", base_dir.display());
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let valid = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\', '\0']);

        if !valid {
            return Err(anyhow::anyhow!("Invalid document name: {:?}", filename));
        }
        Ok(self.base_dir.join(filename))
    }

    /// Writes `content` to `filename`, replacing any previous content.
    pub async fn write(&self, filename: &str, content: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub async fn delete(&self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))
    }

    pub async fn read(&self, filename: &str) -> Result<String> {
        let path = self.resolve(filename)?;
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Names of all regular files in the storage directory, sorted.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.base_dir)
            .await
            .with_context(|| format!("Failed to list {}", self.base_dir.display()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => tracing::warn!("Skipping non UTF-8 file name {:?}", name),
            }
        }

        names.sort();
        Ok(names)
    }
}

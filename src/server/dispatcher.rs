//! Command Dispatcher
//!
//! Decides what happens synchronously and what is deferred:
//! - **Storage writes / deletes** run inline; the reply reflects only their outcome.
//! - **Index mutations** are queued on the index `WorkerPool` after a successful storage
//!   call and applied later. A full queue drops them silently (see the queue's overflow stats).
//! - **Searches and counts** read the `InvertedIndex` inline and may not yet reflect
//!   mutations that are still queued.

use super::protocol::{Command, Reply, ServerStats};
use crate::executor::pool::{WorkerPool, WorkerPoolConfig};
use crate::search::index::InvertedIndex;
use crate::search::types::IndexTask;
use crate::storage::files::FileStorage;

use anyhow::Result;
use std::sync::Arc;

pub struct Dispatcher {
    storage: FileStorage,
    index: Arc<InvertedIndex>,
    index_pool: WorkerPool<IndexTask>,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty index. The index pool is not started until `start()`.
    pub fn new(storage: FileStorage, index_pool_config: WorkerPoolConfig) -> Self {
        let index = Arc::new(InvertedIndex::new());

        let worker_index = index.clone();
        let index_pool = WorkerPool::new("index", index_pool_config, move |task: IndexTask| {
            let index = worker_index.clone();
            async move {
                index.apply(task);
                Ok(())
            }
        });

        Self {
            storage,
            index,
            index_pool,
        }
    }

    pub async fn start(&self) {
        self.index_pool.start().await;
    }

    /// Drains pending index mutations and stops the index workers.
    pub async fn shutdown(&self) {
        self.index_pool.terminate().await;
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn index_pool(&self) -> &WorkerPool<IndexTask> {
        &self.index_pool
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Indexes every document already in storage. Meant to run before serving traffic.
    ///
    /// Documents that cannot be read are skipped. Returns how many were indexed.
    pub async fn rebuild_index(&self) -> Result<usize> {
        let filenames = self.storage.list().await?;
        let mut indexed = 0;

        for filename in filenames {
            match self.storage.read(&filename).await {
                Ok(content) => {
                    self.index.add_file(&filename, &content);
                    indexed += 1;
                }
                Err(e) => tracing::warn!("Skipping {} during index rebuild: {:#}", filename, e),
            }
        }

        tracing::info!("Rebuilt index from {} stored documents", indexed);
        Ok(indexed)
    }

    /// Parses and executes one request line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match Command::parse(line) {
            Some(command) => self.execute(command).await,
            None => {
                tracing::debug!("Invalid command: {:?}", line.trim_end());
                Reply::InvalidCommand
            }
        }
    }

    pub async fn execute(&self, command: Command) -> Reply {
        match command {
            Command::Add { filename, content } => {
                if let Err(e) = self.storage.write(&filename, &content).await {
                    tracing::warn!("ADD {} failed: {:#}", filename, e);
                    return Reply::Failed;
                }
                let task_id = self.index_pool.add_task(IndexTask::Add {
                    filename: filename.clone(),
                    content,
                });
                tracing::debug!("Stored {}, index task {} submitted", filename, task_id);
                Reply::Added
            }
            Command::Delete { filename } => {
                if let Err(e) = self.storage.delete(&filename).await {
                    tracing::warn!("DELETE {} failed: {:#}", filename, e);
                    return Reply::Failed;
                }
                let task_id = self.index_pool.add_task(IndexTask::Delete {
                    filename: filename.clone(),
                });
                tracing::debug!("Deleted {}, index task {} submitted", filename, task_id);
                Reply::Deleted
            }
            Command::Search { term } => Reply::SearchResults(self.index.search(&term)),
            Command::CheckIndex => Reply::IndexCount(self.index.indexed_files_count()),
            Command::Stats => Reply::Stats(self.stats()),
        }
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            indexed_files: self.index.indexed_files_count(),
            terms: self.index.term_count(),
            index_pool: self.index_pool.stats(),
        }
    }
}

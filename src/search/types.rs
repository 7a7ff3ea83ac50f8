use serde::{Deserialize, Serialize};

/// An index mutation queued by the dispatcher and applied by an index worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IndexTask {
    /// Index every term of `content` under `filename`.
    Add { filename: String, content: String },
    /// Remove every posting of `filename`.
    Delete { filename: String },
}

impl IndexTask {
    pub fn filename(&self) -> &str {
        match self {
            IndexTask::Add { filename, .. } | IndexTask::Delete { filename } => filename,
        }
    }
}

//! Line Protocol Definitions
//!
//! One ASCII command per connection, newline-terminated:
//!
//! | Request | Reply |
//! |---|---|
//! | `ADD <filename> <content>` | `added` / `failed` |
//! | `DELETE <filename>` | `deleted` / `failed` |
//! | `SEARCH <term>` | one filename per line, empty if no hits |
//! | `CHECK_INDEX` | decimal indexed-files count |
//! | `STATS` | one JSON object |
//! | anything else | `invalid command` |

use crate::executor::pool::PoolStats;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 12345;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { filename: String, content: String },
    Delete { filename: String },
    Search { term: String },
    CheckIndex,
    Stats,
}

impl Command {
    /// Parses one request line. Returns `None` for unknown commands or missing arguments.
    ///
    /// `ADD` content is everything after the single space following the filename and may
    /// be empty. `DELETE` and `SEARCH` use only their first argument.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        match command {
            "ADD" => {
                let rest = rest.trim_start();
                let (filename, content) = rest
                    .split_once(char::is_whitespace)
                    .unwrap_or((rest, ""));
                if filename.is_empty() {
                    return None;
                }
                Some(Command::Add {
                    filename: filename.to_string(),
                    content: content.to_string(),
                })
            }
            "DELETE" => first_argument(rest).map(|filename| Command::Delete { filename }),
            "SEARCH" => first_argument(rest).map(|term| Command::Search { term }),
            "CHECK_INDEX" => Some(Command::CheckIndex),
            "STATS" => Some(Command::Stats),
            _ => None,
        }
    }
}

fn first_argument(rest: &str) -> Option<String> {
    rest.split_whitespace().next().map(str::to_string)
}

/// Diagnostics returned by `STATS`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerStats {
    pub indexed_files: i64,
    pub terms: usize,
    pub index_pool: PoolStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Added,
    Deleted,
    Failed,
    InvalidCommand,
    SearchResults(Vec<String>),
    IndexCount(i64),
    Stats(ServerStats),
}

impl Reply {
    /// Encodes the reply as sent on the socket.
    pub fn to_wire(&self) -> String {
        match self {
            Reply::Added => "added\n".to_string(),
            Reply::Deleted => "deleted\n".to_string(),
            Reply::Failed => "failed\n".to_string(),
            Reply::InvalidCommand => "invalid command\n".to_string(),
            Reply::SearchResults(filenames) => filenames
                .iter()
                .map(|filename| format!("{}\n", filename))
                .collect(),
            Reply::IndexCount(count) => format!("{}\n", count),
            Reply::Stats(stats) => match serde_json::to_string(stats) {
                Ok(json) => format!("{}\n", json),
                Err(e) => {
                    tracing::error!("Failed to encode stats: {}", e);
                    "failed\n".to_string()
                }
            },
        }
    }
}

//! Server Configuration
//!
//! Defaults, overridden by environment variables, overridden by command-line flags.

use crate::executor::pool::WorkerPoolConfig;
use crate::server::listener::ConnectionLimits;
use crate::server::protocol::DEFAULT_PORT;

use anyhow::{Context, Result};
use std::fmt::Display;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_BIND: &str = "DOCINDEX_BIND";
pub const ENV_STORAGE_DIR: &str = "DOCINDEX_STORAGE_DIR";
pub const ENV_LOG: &str = "DOCINDEX_LOG";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub storage_dir: PathBuf,
    pub index_workers: usize,
    pub index_queue_capacity: usize,
    pub connection_workers: usize,
    pub connection_queue_capacity: usize,
    pub read_timeout: Duration,
    pub max_line_bytes: usize,
    /// Replay stored documents into the index before accepting connections.
    pub rebuild_index: bool,
    pub log_level: tracing::Level,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), DEFAULT_PORT),
            storage_dir: PathBuf::from("./server_files"),
            index_workers: 6,
            index_queue_capacity: 20,
            connection_workers: 4,
            connection_queue_capacity: 20,
            read_timeout: Duration::from_secs(30),
            max_line_bytes: 16 * 1024 * 1024,
            rebuild_index: false,
            log_level: tracing::Level::INFO,
        }
    }
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [options]

Options:
  --bind <addr:port>           Listen address (default 0.0.0.0:{DEFAULT_PORT}, env {ENV_BIND})
  --storage-dir <path>         Document directory (default ./server_files, env {ENV_STORAGE_DIR})
  --index-workers <n>          Index worker count (default 6)
  --index-queue <n>            Index task queue capacity (default 20)
  --connection-workers <n>     Connection worker count (default 4)
  --connection-queue <n>       Pending connection capacity (default 20)
  --read-timeout-ms <ms>       Request read timeout (default 30000)
  --max-line-bytes <n>         Longest accepted request line (default 16 MiB)
  --rebuild-index              Index stored documents before serving
  --log-level <level>          trace|debug|info|warn|error (default info, env {ENV_LOG})

Example: {program} --bind 127.0.0.1:12345 --storage-dir ./server_files"
    )
}

fn parse_value<T>(flag: &str, raw: Option<String>) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = raw.with_context(|| format!("{} requires a value", flag))?;
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value {:?} for {}: {}", raw, flag, e))
}

impl ServerConfig {
    /// Builds the configuration from the process environment and arguments.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_args(std::env::args().skip(1))?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = parse_value(ENV_BIND, Some(bind))?;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = parse_value(ENV_LOG, Some(level))?;
        }
        Ok(())
    }

    /// Applies command-line flags (without the program name).
    pub fn apply_args<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--bind" => self.bind = parse_value(&flag, args.next())?,
                "--storage-dir" => self.storage_dir = parse_value(&flag, args.next())?,
                "--index-workers" => self.index_workers = parse_value(&flag, args.next())?,
                "--index-queue" => self.index_queue_capacity = parse_value(&flag, args.next())?,
                "--connection-workers" => {
                    self.connection_workers = parse_value(&flag, args.next())?
                }
                "--connection-queue" => {
                    self.connection_queue_capacity = parse_value(&flag, args.next())?
                }
                "--read-timeout-ms" => {
                    self.read_timeout = Duration::from_millis(parse_value(&flag, args.next())?)
                }
                "--max-line-bytes" => self.max_line_bytes = parse_value(&flag, args.next())?,
                "--rebuild-index" => self.rebuild_index = true,
                "--log-level" => self.log_level = parse_value(&flag, args.next())?,
                other => return Err(anyhow::anyhow!("Unknown option: {}", other)),
            }
        }

        for (flag, value) in [
            ("--index-workers", self.index_workers),
            ("--index-queue", self.index_queue_capacity),
            ("--connection-workers", self.connection_workers),
        ] {
            if value == 0 {
                return Err(anyhow::anyhow!("{} must be at least 1", flag));
            }
        }
        Ok(())
    }

    pub fn index_pool(&self) -> WorkerPoolConfig {
        WorkerPoolConfig {
            worker_count: self.index_workers,
            queue_capacity: self.index_queue_capacity,
            task_delay: Duration::ZERO,
        }
    }

    pub fn connection_pool(&self) -> WorkerPoolConfig {
        WorkerPoolConfig {
            worker_count: self.connection_workers,
            queue_capacity: self.connection_queue_capacity,
            task_delay: Duration::ZERO,
        }
    }

    pub fn connection_limits(&self) -> ConnectionLimits {
        ConnectionLimits {
            read_timeout: self.read_timeout,
            max_line_bytes: self.max_line_bytes,
        }
    }
}

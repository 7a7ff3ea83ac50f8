//! TCP Front End
//!
//! Accepts connections and hands each one to the connection `WorkerPool`, which bounds
//! how many requests are served in parallel. A connection serves exactly one
//! request/response cycle and is then closed.

use super::dispatcher::Dispatcher;
use crate::config::ServerConfig;
use crate::executor::pool::WorkerPool;
use crate::executor::types::TaskStatus;
use crate::storage::files::FileStorage;

use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Limits applied while reading a request line.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub read_timeout: Duration,
    pub max_line_bytes: usize,
}

/// An accepted socket waiting for a connection worker.
#[derive(Debug)]
pub struct Connection {
    pub stream: TcpStream,
    pub peer: SocketAddr,
}

pub struct IndexServer {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    connections: WorkerPool<Connection>,
}

impl IndexServer {
    /// Opens storage, optionally rebuilds the index from it, and binds the listener.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let storage = FileStorage::new(&config.storage_dir).await?;
        let dispatcher = Arc::new(Dispatcher::new(storage, config.index_pool()));

        if config.rebuild_index {
            dispatcher.rebuild_index().await?;
        }

        let listener = TcpListener::bind(config.bind)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind))?;

        let limits = config.connection_limits();
        let handler_dispatcher = dispatcher.clone();
        let connections = WorkerPool::new(
            "connections",
            config.connection_pool(),
            move |connection: Connection| {
                let dispatcher = handler_dispatcher.clone();
                async move { serve_connection(&dispatcher, connection, limits).await }
            },
        );

        Ok(Self {
            listener,
            dispatcher,
            connections,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// Serves until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves until `shutdown` completes, then drains both pools.
    ///
    /// Connections already accepted are answered; queued index mutations are applied
    /// before this returns.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let Self {
            listener,
            dispatcher,
            connections,
        } = self;

        dispatcher.start().await;
        connections.start().await;
        tracing::info!("Listening on {}", listener.local_addr()?);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let task_id = connections.add_task(Connection { stream, peer });
                        if connections.task_status(task_id) == Some(TaskStatus::Dropped) {
                            tracing::warn!("Connection pool saturated, closed connection from {}", peer);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }

        drop(listener);
        connections.terminate().await;
        dispatcher.shutdown().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Reads one request line, dispatches it and writes the reply.
async fn serve_connection(
    dispatcher: &Dispatcher,
    connection: Connection,
    limits: ConnectionLimits,
) -> Result<()> {
    let Connection { mut stream, peer } = connection;
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader).take(limits.max_line_bytes as u64);

    let mut request = Vec::new();
    let read = tokio::time::timeout(limits.read_timeout, reader.read_until(b'\n', &mut request))
        .await
        .with_context(|| format!("Timed out reading request from {}", peer))?
        .with_context(|| format!("Failed to read request from {}", peer))?;

    if read == 0 {
        tracing::debug!("{} closed without sending a request", peer);
        return Ok(());
    }
    if request.last() != Some(&b'\n') && request.len() >= limits.max_line_bytes {
        return Err(anyhow::anyhow!(
            "Request from {} exceeds {} bytes",
            peer,
            limits.max_line_bytes
        ));
    }

    let line = String::from_utf8_lossy(&request);
    let reply = dispatcher.handle_line(&line).await;

    writer
        .write_all(reply.to_wire().as_bytes())
        .await
        .with_context(|| format!("Failed to send reply to {}", peer))?;
    writer.shutdown().await?;

    tracing::debug!("Served request from {}", peer);
    Ok(())
}

//! TCP listener for lookup clients.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Stop accepting and close held connections on shutdown
//! - Graceful handling of accept errors
//!
//! The lookup protocol itself lives in the registry layer; connections here
//! are held open until the peer leaves or the daemon drains.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::daemon::DaemonError;
use crate::lifecycle::ShutdownListener;

/// Bind a listener, mapping failure to [`DaemonError::Bind`].
pub async fn bind_listener(address: &str) -> Result<TcpListener, DaemonError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| DaemonError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Accept loop for TCP clients.
pub struct TcpServer {
    inner: TcpListener,
}

impl TcpServer {
    pub fn new(inner: TcpListener) -> Self {
        Self { inner }
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Accept clients until shutdown, then close every connection.
    pub async fn serve(self, mut shutdown: ShutdownListener) {
        let spawner = shutdown.clone();
        let mut connections = JoinSet::new();

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => break,
                accepted = self.inner.accept() => accepted,
                Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            };

            match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(peer_addr = %peer, open = connections.len() + 1, "TCP client connected");
                    connections.spawn(hold_connection(stream, peer, spawner.clone()));
                }
                Err(e) => {
                    // Usually fd exhaustion; back off instead of spinning.
                    tracing::warn!(error = %e, "Failed to accept TCP connection");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }

        drop(self.inner);
        tracing::info!(open = connections.len(), "TCP listener closed, draining clients");
        while connections.join_next().await.is_some() {}
        tracing::info!("TCP clients drained");
    }
}

async fn hold_connection(mut stream: TcpStream, peer: SocketAddr, mut shutdown: ShutdownListener) {
    let mut buf = [0u8; 1024];

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            read = stream.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => tracing::trace!(peer_addr = %peer, bytes = n, "Client data ignored"),
                Err(e) => {
                    tracing::debug!(peer_addr = %peer, error = %e, "Client connection error");
                    break;
                }
            },
        }
    }

    let _ = stream.shutdown().await;
    tracing::debug!(peer_addr = %peer, "TCP client disconnected");
}

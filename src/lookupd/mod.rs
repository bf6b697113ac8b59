//! The lookup daemon: TCP and HTTP listeners driven by the lifecycle layer.
//!
//! # Data Flow
//! ```text
//! run():
//!     bind tcp + http → serve until shutdown → drain both → return
//!
//! shutdown():
//!     trigger → wait until run() has drained (or never started)
//! ```

pub mod http;
pub mod tcp;

use std::net::SocketAddr;

use tokio::sync::watch;

use crate::config::LookupdOptions;
use crate::daemon::{Daemon, DaemonError};
use crate::lifecycle::Shutdown;
use crate::lookupd::http::{HttpServer, NodeInfo};
use crate::lookupd::tcp::{bind_listener, TcpServer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Serving,
    Drained,
}

/// Addresses the listeners actually bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundAddrs {
    pub tcp: SocketAddr,
    pub http: SocketAddr,
}

/// A lookup daemon built from resolved options.
pub struct LookupDaemon {
    options: LookupdOptions,
    shutdown: Shutdown,
    phase: watch::Sender<Phase>,
    bound: watch::Sender<Option<BoundAddrs>>,
}

impl LookupDaemon {
    pub fn new(options: LookupdOptions) -> Self {
        Self {
            options,
            shutdown: Shutdown::new(),
            phase: watch::channel(Phase::Idle).0,
            bound: watch::channel(None).0,
        }
    }

    /// Wait for the listeners to bind.
    ///
    /// Returns `None` if the run-loop ended without binding. Waits forever if
    /// `run` is never called.
    pub async fn bound_addrs(&self) -> Option<BoundAddrs> {
        let mut bound = self.bound.subscribe();
        let mut phase = self.phase.subscribe();

        loop {
            if let Some(addrs) = *bound.borrow_and_update() {
                return Some(addrs);
            }
            if *phase.borrow_and_update() == Phase::Drained {
                return None;
            }
            tokio::select! {
                _ = bound.changed() => {}
                _ = phase.changed() => {}
            }
        }
    }

    fn node_info(&self, addrs: BoundAddrs) -> NodeInfo {
        NodeInfo {
            version: crate::VERSION.to_string(),
            tcp_address: addrs.tcp.to_string(),
            http_address: addrs.http.to_string(),
            broadcast_address: self.options.broadcast_address.clone(),
            inactive_producer_timeout_secs: self.options.inactive_producer_timeout_secs,
            tombstone_lifetime_secs: self.options.tombstone_lifetime_secs,
        }
    }

    async fn serve(&self) -> Result<(), DaemonError> {
        let tcp = TcpServer::new(bind_listener(&self.options.tcp_address).await?);
        let http_listener = bind_listener(&self.options.http_address).await?;

        let addrs = BoundAddrs {
            tcp: tcp.local_addr().map_err(|source| DaemonError::Bind {
                address: self.options.tcp_address.clone(),
                source,
            })?,
            http: http_listener.local_addr().map_err(|source| DaemonError::Bind {
                address: self.options.http_address.clone(),
                source,
            })?,
        };
        self.bound.send_replace(Some(addrs));

        tracing::info!(
            tcp_address = %addrs.tcp,
            http_address = %addrs.http,
            broadcast_address = self.options.broadcast_address.as_deref().unwrap_or("-"),
            "lookupd listening"
        );

        let http = HttpServer::new(self.node_info(addrs));
        let http_task = async {
            let result = http.run(http_listener, self.shutdown.subscribe()).await;
            if result.is_err() {
                // Take the TCP side down with it.
                self.shutdown.trigger();
            }
            result
        };

        let ((), http_result) = tokio::join!(tcp.serve(self.shutdown.subscribe()), http_task);
        http_result
    }
}

impl Daemon for LookupDaemon {
    async fn run(&self) -> Result<(), DaemonError> {
        let entered = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Idle {
                *phase = Phase::Serving;
                true
            } else {
                false
            }
        });
        if !entered {
            tracing::warn!("Run-loop already entered, ignoring");
            return Ok(());
        }

        let result = if self.shutdown.is_triggered() {
            tracing::info!("Shutdown requested before start, not binding listeners");
            Ok(())
        } else {
            self.serve().await
        };

        self.shutdown.trigger();
        self.phase.send_replace(Phase::Drained);
        result
    }

    async fn shutdown(&self) {
        self.shutdown.trigger();

        let mut phase = self.phase.subscribe();
        let _ = phase.wait_for(|phase| *phase != Phase::Serving).await;
        tracing::debug!("lookupd shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_options() -> LookupdOptions {
        LookupdOptions {
            tcp_address: "127.0.0.1:0".into(),
            http_address: "127.0.0.1:0".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_shutdown_before_run_is_immediate() {
        let daemon = LookupDaemon::new(local_options());

        tokio::time::timeout(Duration::from_secs(1), daemon.shutdown())
            .await
            .expect("shutdown of an idle daemon should not wait");

        // A late run-loop sees the latched trigger and never binds.
        daemon.run().await.unwrap();
        assert_eq!(daemon.bound_addrs().await, None);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let daemon = LookupDaemon::new(local_options());
        daemon.shutdown().await;
        daemon.shutdown().await;
    }

    #[tokio::test]
    async fn test_bind_failure_ends_run() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let daemon = LookupDaemon::new(LookupdOptions {
            http_address: taken.local_addr().unwrap().to_string(),
            ..local_options()
        });

        let err = daemon.run().await.unwrap_err();
        assert!(matches!(err, DaemonError::Bind { .. }));

        // Nothing left to wait for.
        tokio::time::timeout(Duration::from_secs(1), daemon.shutdown())
            .await
            .unwrap();
    }
}

//! The daemon contract consumed by the lifecycle controller.
//!
//! The controller knows nothing about what the daemon serves. It needs only
//! a run-loop it can await for the life of the service and a shutdown it can
//! race against a deadline.

use std::future::Future;

use thiserror::Error;

/// A long-running daemon driven by [`crate::lifecycle::ServiceAdapter`].
pub trait Daemon: Send + Sync + 'static {
    /// Serve until stopped.
    ///
    /// Completes once `shutdown` has been called from elsewhere and the
    /// daemon has drained, or when the daemon fails on its own.
    fn run(&self) -> impl Future<Output = Result<(), DaemonError>> + Send;

    /// Tear the daemon down. May take arbitrarily long.
    ///
    /// Must be idempotent, and must return promptly if `run` was never
    /// entered.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

/// Errors a daemon reports from its run-loop.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// A listener could not be bound.
    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// A server failed while serving.
    #[error("{server} server failed: {source}")]
    Serve {
        server: &'static str,
        #[source]
        source: std::io::Error,
    },
}

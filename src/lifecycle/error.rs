//! Lifecycle error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::daemon::DaemonError;

/// Errors surfaced by `start`, `stop` and the signal supervisor.
///
/// Every variant except `AlreadyStarted` is fatal: the entry point logs it
/// and exits the process with [`LifecycleError::exit_code`].
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The daemon's run-loop failed.
    #[error(transparent)]
    Daemon(#[from] DaemonError),

    /// Graceful shutdown did not finish before the deadline.
    #[error("failed to stop lookupd in {deadline:?}")]
    ShutdownTimeout { deadline: Duration },

    /// The shutdown task ended without completing (it panicked).
    #[error("shutdown task ended without completing")]
    ShutdownAborted,

    /// `start` was called on an adapter that already started.
    #[error("service already started")]
    AlreadyStarted,

    /// A second stop signal arrived while the first stop was in progress.
    #[error("received {signal} while stopping, exiting immediately")]
    Interrupted { signal: &'static str },
}

impl LifecycleError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LifecycleError::AlreadyStarted)
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::Interrupted { .. } => 130,
            _ => 1,
        }
    }
}

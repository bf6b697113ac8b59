//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate the first signal into a supervised stop
//! - Force exit on a second signal while stopping
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Multiple SIGTERM/SIGINT triggers forced shutdown

use std::future::Future;

use crate::config::LookupdOptions;
use crate::daemon::Daemon;
use crate::lifecycle::adapter::ServiceAdapter;
use crate::lifecycle::error::LifecycleError;

/// Wait for the next stop request from the host and name the signal.
pub async fn stop_requested() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = term.recv() => "SIGTERM",
                Ok(()) = tokio::signal::ctrl_c() => "SIGINT",
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for SIGINT only");
                interrupt().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        interrupt().await
    }
}

async fn interrupt() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install SIGINT handler");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

/// Stop the service when the host asks for it.
///
/// Returns the outcome of the stop. A second signal before the stop finishes
/// yields [`LifecycleError::Interrupted`].
pub async fn supervise_signals<D, F>(adapter: &ServiceAdapter<D, F>) -> Result<(), LifecycleError>
where
    D: Daemon,
    F: Fn(LookupdOptions) -> D + Send + Sync,
{
    supervise_stop_requests(adapter, stop_requested).await
}

/// Stop the service on the first request from `next_request`.
///
/// `next_request` is called once for the request that starts the stop and
/// once more to listen for a second request while the stop runs.
pub async fn supervise_stop_requests<D, F, R, Fut>(
    adapter: &ServiceAdapter<D, F>,
    mut next_request: R,
) -> Result<(), LifecycleError>
where
    D: Daemon,
    F: Fn(LookupdOptions) -> D + Send + Sync,
    R: FnMut() -> Fut,
    Fut: Future<Output = &'static str>,
{
    let signal = next_request().await;
    tracing::info!(signal, "Stop requested");

    tokio::select! {
        result = adapter.stop() => result,
        second = next_request() => {
            tracing::error!(signal = second, "Second stop request while stopping");
            Err(LifecycleError::Interrupted { signal: second })
        }
    }
}

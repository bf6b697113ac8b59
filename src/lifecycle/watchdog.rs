//! Bounded-time graceful shutdown.
//!
//! The daemon's shutdown runs on its own task while the caller waits on a
//! single-slot completion channel raced against a deadline timer. Whichever
//! finishes first decides the outcome; the other is discarded. A shutdown that
//! loses the race is not cancelled, it simply has no observer any more.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::lifecycle::error::LifecycleError;

/// Races a shutdown future against a fixed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownWatchdog {
    deadline: Duration,
}

impl ShutdownWatchdog {
    /// Deadline used when no `shutdown_timeout_secs` is configured.
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `shutdown` on a separate task and wait at most `deadline` for it.
    ///
    /// Returns how long the shutdown took. A timeout is reported as
    /// [`LifecycleError::ShutdownTimeout`]; the caller is expected to treat
    /// it as fatal.
    pub async fn supervise<F>(&self, shutdown: F) -> Result<Duration, LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let started = Instant::now();
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            shutdown.await;
            let _ = done_tx.send(());
        });

        tokio::select! {
            done = done_rx => match done {
                Ok(()) => Ok(started.elapsed()),
                Err(_) => {
                    tracing::error!("Shutdown task ended without completing");
                    Err(LifecycleError::ShutdownAborted)
                }
            },
            _ = tokio::time::sleep(self.deadline) => {
                tracing::error!(
                    deadline_secs = self.deadline.as_secs(),
                    "Graceful shutdown did not finish before the deadline"
                );
                Err(LifecycleError::ShutdownTimeout { deadline: self.deadline })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fast_shutdown_returns_early() {
        let watchdog = ShutdownWatchdog::new(ShutdownWatchdog::DEFAULT_DEADLINE);
        let started = Instant::now();

        let took = watchdog
            .supervise(tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(took >= Duration::from_secs(1));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_shutdown_times_out_at_deadline() {
        let watchdog = ShutdownWatchdog::new(Duration::from_secs(30));
        let started = Instant::now();

        let err = watchdog
            .supervise(std::future::pending::<()>())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::ShutdownTimeout { deadline } if deadline == Duration::from_secs(30)
        ));
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_losing_shutdown_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let watchdog = ShutdownWatchdog::new(Duration::from_secs(5));

        let result = watchdog
            .supervise(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                flag.store(true, Ordering::SeqCst);
            })
            .await;
        assert!(result.is_err());
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_shutdown_is_aborted() {
        let watchdog = ShutdownWatchdog::new(Duration::from_secs(5));
        let err = watchdog
            .supervise(async {
                panic!("shutdown exploded");
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::ShutdownAborted));
    }
}

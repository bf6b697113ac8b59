//! Shutdown coordination for the daemon's servers.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Every long-running task holds a [`ShutdownListener`]. Unlike a broadcast,
/// the trigger is latched: a listener created after `trigger` still sees it.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Repeated calls are harmless.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether `trigger` has been called.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One task's view of the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Wait until shutdown is triggered.
    ///
    /// A dropped coordinator counts as a trigger.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }

    /// Consume the listener, waiting for the trigger.
    pub async fn triggered(mut self) {
        self.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let listener = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), listener.triggered())
            .await
            .expect("latched trigger should be visible");
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_listeners_wake_on_trigger() {
        let shutdown = Shutdown::new();
        let a = tokio::spawn(shutdown.subscribe().triggered());
        let b = tokio::spawn(shutdown.subscribe().triggered());

        shutdown.trigger();
        shutdown.trigger();

        a.await.unwrap();
        b.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_coordinator_releases_listeners() {
        let shutdown = Shutdown::new();
        let listener = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), listener.triggered())
            .await
            .expect("listener should not hang once the coordinator is gone");
    }
}

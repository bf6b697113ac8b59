//! Shared test doubles for lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lookupd::config::LookupdOptions;
use lookupd::lifecycle::{ServiceAdapter, ServiceState, Shutdown, StartRequest};
use lookupd::{Daemon, DaemonError};

/// How a scripted daemon's shutdown behaves.
#[derive(Debug, Clone, Copy)]
pub enum ShutdownBehaviour {
    /// Return after the given delay.
    After(Duration),
    /// Never return.
    Never,
}

/// What the scripted daemons observed.
#[derive(Debug, Default)]
pub struct Observed {
    pub builds: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub options: Mutex<Option<LookupdOptions>>,
}

impl Observed {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> Option<LookupdOptions> {
        self.options.lock().unwrap().clone()
    }
}

/// A daemon whose run-loop waits for shutdown and whose shutdown is scripted.
pub struct ScriptedDaemon {
    behaviour: ShutdownBehaviour,
    observed: Arc<Observed>,
    stop: Shutdown,
}

impl Daemon for ScriptedDaemon {
    async fn run(&self) -> Result<(), DaemonError> {
        self.stop.subscribe().triggered().await;
        Ok(())
    }

    async fn shutdown(&self) {
        self.observed.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        self.stop.trigger();
        match self.behaviour {
            ShutdownBehaviour::After(delay) => tokio::time::sleep(delay).await,
            ShutdownBehaviour::Never => std::future::pending::<()>().await,
        }
    }
}

/// Build an adapter around scripted daemons, plus what they observed.
pub fn scripted_adapter(
    request: StartRequest,
    behaviour: ShutdownBehaviour,
) -> (
    Arc<ServiceAdapter<ScriptedDaemon, impl Fn(LookupdOptions) -> ScriptedDaemon + Send + Sync>>,
    Arc<Observed>,
) {
    scripted_adapter_with_build_hook(request, behaviour, || {})
}

/// Like [`scripted_adapter`], but runs `before_build` (blocking) inside the
/// build step, while the adapter is still `Starting`.
pub fn scripted_adapter_with_build_hook(
    request: StartRequest,
    behaviour: ShutdownBehaviour,
    before_build: impl Fn() + Send + Sync + 'static,
) -> (
    Arc<ServiceAdapter<ScriptedDaemon, impl Fn(LookupdOptions) -> ScriptedDaemon + Send + Sync>>,
    Arc<Observed>,
) {
    let observed = Arc::new(Observed::default());
    let shared = observed.clone();

    let adapter = ServiceAdapter::new(request, move |options: LookupdOptions| {
        before_build();
        shared.builds.fetch_add(1, Ordering::SeqCst);
        *shared.options.lock().unwrap() = Some(options);
        ScriptedDaemon {
            behaviour,
            observed: shared.clone(),
            stop: Shutdown::new(),
        }
    });

    (Arc::new(adapter), observed)
}

/// Wait until the adapter reaches `state`.
#[allow(dead_code)]
pub async fn wait_for_state<D, F>(adapter: &ServiceAdapter<D, F>, state: ServiceState)
where
    D: Daemon,
    F: Fn(LookupdOptions) -> D + Send + Sync,
{
    let mut states = adapter.subscribe_state();
    states.wait_for(|current| *current == state).await.unwrap();
}

//! Supervisor-facing start/stop state machine.
//!
//! # State Transitions
//! ```text
//! Uninitialized → Starting: start called
//! Starting → Running:       options resolved, daemon built, run entered
//! Running → Stopping:       stop called, shutdown handed to the watchdog
//! Stopping → Stopped:       shutdown finished before the deadline
//! ```
//! A version request or a config error ends `start` while still `Starting`.
//! A stop that arrives while `Starting` moves straight to `Stopping`; `start`
//! then drops the daemon it built without running it and ends in `Stopped`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::watch;

use crate::config::{ConfigResolver, LookupdOptions, OptionsOverlay};
use crate::daemon::Daemon;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::watchdog::ShutdownWatchdog;
use crate::observability::LogLevelHandle;

/// Where the service is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Uninitialized => "uninitialized",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// What the supervisor asked for when launching the service.
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    /// Optional TOML config file.
    pub config_path: Option<PathBuf>,
    /// Flags given explicitly on the command line.
    pub flags: OptionsOverlay,
    /// Print the version and exit instead of running.
    pub show_version: bool,
}

/// How `start` ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Only the version was requested; the daemon was never built.
    VersionRequested(String),
    /// The daemon ran and its run-loop returned.
    Completed,
    /// A stop arrived before the daemon was running; it was never run.
    StoppedBeforeRun,
}

struct ActiveDaemon<D> {
    daemon: Arc<D>,
    watchdog: ShutdownWatchdog,
}

/// Owns at most one daemon and drives it on behalf of the supervisor.
///
/// `start` blocks for the life of the service. `stop` is called from another
/// task and returns within the configured shutdown deadline, or reports a
/// fatal timeout.
pub struct ServiceAdapter<D, F> {
    request: StartRequest,
    build: F,
    active: ArcSwapOption<ActiveDaemon<D>>,
    state: watch::Sender<ServiceState>,
    log_level: Option<LogLevelHandle>,
}

impl<D, F> ServiceAdapter<D, F>
where
    D: Daemon,
    F: Fn(LookupdOptions) -> D + Send + Sync,
{
    /// Create an adapter that builds its daemon with `build`.
    pub fn new(request: StartRequest, build: F) -> Self {
        let (state, _) = watch::channel(ServiceState::Uninitialized);
        Self {
            request,
            build,
            active: ArcSwapOption::empty(),
            state,
            log_level: None,
        }
    }

    /// Attach the logging handle so `verbose` can take effect after resolution.
    pub fn with_log_level(mut self, handle: LogLevelHandle) -> Self {
        self.log_level = Some(handle);
        self
    }

    pub fn state(&self) -> ServiceState {
        *self.state.borrow()
    }

    /// The running daemon, if `start` built one and no `stop` has taken it.
    pub fn daemon(&self) -> Option<Arc<D>> {
        self.active
            .load_full()
            .map(|active| Arc::clone(&active.daemon))
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    /// Resolve options, build the daemon and run it until it stops.
    pub async fn start(&self) -> Result<StartOutcome, LifecycleError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == ServiceState::Uninitialized {
                *state = ServiceState::Starting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(LifecycleError::AlreadyStarted);
        }

        if self.request.show_version {
            return Ok(StartOutcome::VersionRequested(crate::version_string()));
        }

        let options = ConfigResolver::new(LookupdOptions::default())
            .with_explicit_flags(self.request.flags.clone())
            .resolve(self.request.config_path.as_deref())?;

        if options.verbose {
            if let Some(handle) = &self.log_level {
                if let Err(e) = handle.set_verbose() {
                    tracing::warn!(error = %e, "Failed to enable verbose logging");
                }
            }
        }

        tracing::info!(
            tcp_address = %options.tcp_address,
            http_address = %options.http_address,
            broadcast_address = options.broadcast_address.as_deref().unwrap_or("-"),
            shutdown_timeout_secs = options.shutdown_timeout_secs,
            "Configuration resolved"
        );

        let watchdog = ShutdownWatchdog::new(options.shutdown_timeout());
        let daemon = Arc::new((self.build)(options));
        self.active.store(Some(Arc::new(ActiveDaemon {
            daemon: Arc::clone(&daemon),
            watchdog,
        })));

        let running = self.state.send_if_modified(|state| {
            if *state == ServiceState::Starting {
                *state = ServiceState::Running;
                true
            } else {
                false
            }
        });
        if !running {
            // Stopped while starting. If the stop found the slot empty, the
            // daemon is still here and nobody else will finish the stop.
            if self.active.swap(None).is_some() {
                self.state.send_replace(ServiceState::Stopped);
            }
            tracing::info!("Stop requested during startup, daemon not run");
            return Ok(StartOutcome::StoppedBeforeRun);
        }

        daemon.run().await?;
        tracing::info!("Daemon run-loop returned");
        Ok(StartOutcome::Completed)
    }

    /// Shut the daemon down, bounded by the configured deadline.
    ///
    /// With no daemon (never started, or already stopped) this is a no-op.
    /// While `start` is still building the daemon the stop is recorded and
    /// `start` returns without running it.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let Some(active) = self.active.swap(None) else {
            let latched = self.state.send_if_modified(|state| {
                if *state == ServiceState::Starting {
                    *state = ServiceState::Stopping;
                    true
                } else {
                    false
                }
            });
            if latched {
                tracing::info!("Stop requested during startup");
            } else {
                tracing::debug!(state = %self.state(), "Stop requested with no running daemon");
            }
            return Ok(());
        };

        self.state.send_replace(ServiceState::Stopping);
        tracing::info!(
            deadline_secs = active.watchdog.deadline().as_secs(),
            "Stopping daemon"
        );

        let daemon = Arc::clone(&active.daemon);
        let took = active
            .watchdog
            .supervise(async move { daemon.shutdown().await })
            .await?;

        self.state.send_replace(ServiceState::Stopped);
        tracing::info!(elapsed_ms = took.as_millis() as u64, "Daemon stopped");
        Ok(())
    }
}

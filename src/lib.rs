//! Lookup daemon with a supervised, bounded-time lifecycle.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod lifecycle;
pub mod lookupd;
pub mod observability;

pub use config::LookupdOptions;
pub use daemon::{Daemon, DaemonError};
pub use lifecycle::{LifecycleError, ServiceAdapter, ShutdownWatchdog};
pub use lookupd::LookupDaemon;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-readable version line, as printed by `--version`.
pub fn version_string() -> String {
    format!("lookupd v{}", VERSION)
}

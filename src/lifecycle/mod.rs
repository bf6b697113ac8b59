//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (adapter.rs):
//!     Resolve options → Build daemon → Run (blocks for the service lifetime)
//!
//! Stop (adapter.rs → watchdog.rs):
//!     Take daemon → Spawn shutdown → Race against deadline → Stopped | fatal
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Stop
//!     Second SIGTERM/SIGINT while stopping → forced exit
//!
//! Daemon internals (shutdown.rs):
//!     trigger → every server's listener wakes → drain
//! ```
//!
//! # Design Decisions
//! - At most one daemon per adapter; stop on an empty adapter is a no-op
//! - Shutdown has timeout: fatal error after deadline, mapped to exit by main
//! - No panics or process exits below `main`

pub mod adapter;
pub mod error;
pub mod shutdown;
pub mod signals;
pub mod watchdog;

pub use adapter::{ServiceAdapter, ServiceState, StartOutcome, StartRequest};
pub use error::LifecycleError;
pub use shutdown::{Shutdown, ShutdownListener};
pub use watchdog::ShutdownWatchdog;

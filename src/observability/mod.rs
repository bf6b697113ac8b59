//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → stdout via the fmt layer
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted strings
//! - Log level configurable via flags, config file and environment

pub mod logging;

pub use logging::LogLevelHandle;

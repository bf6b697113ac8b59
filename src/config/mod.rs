//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flag defaults (LookupdOptions::default)
//!     → loader.rs (optional TOML file → OptionsOverlay)
//!     → explicit command-line flags (OptionsOverlay)
//!     → validation.rs (semantic checks)
//!     → LookupdOptions (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Options are immutable once resolved; each start resolves anew
//! - A config file that fails to parse is fatal, never partially applied
//! - Precedence: explicit flag > config file > flag default

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use resolver::{resolve, ConfigResolver};
pub use schema::{LookupdOptions, OptionsOverlay};
pub use validation::ValidationError;

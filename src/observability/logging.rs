//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level at runtime
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the built-in filters when set
//! - The filter sits behind a reload layer so `verbose` from a config file
//!   can raise the level after startup

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "lookupd=info,tower_http=info";
const VERBOSE_FILTER: &str = "lookupd=debug,tower_http=debug";

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Handle for adjusting the log level after initialization.
#[derive(Clone)]
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogLevelHandle {
    /// Switch to verbose logging, unless `RUST_LOG` chose the filter.
    pub fn set_verbose(&self) -> Result<(), reload::Error> {
        if self.from_env {
            return Ok(());
        }
        self.handle.reload(EnvFilter::new(VERBOSE_FILTER))
    }
}

/// Install the global subscriber.
///
/// Must be called once, before any other logging happens.
pub fn init(verbose: bool) -> LogLevelHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_directives(verbose)), false),
    };

    let (filter_layer, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    LogLevelHandle { handle, from_env }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives() {
        assert_eq!(default_directives(false), "lookupd=info,tower_http=info");
        assert!(default_directives(true).contains("lookupd=debug"));
    }
}

//! Option resolution: flag defaults, then config file, then explicit flags.

use std::path::Path;

use crate::config::loader::{load_overlay, ConfigError};
use crate::config::schema::{LookupdOptions, OptionsOverlay};
use crate::config::validation::validate_options;

/// Merges the option sources into one immutable `LookupdOptions`.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    defaults: LookupdOptions,
    explicit: OptionsOverlay,
}

impl ConfigResolver {
    /// Resolver with the given flag defaults and no explicit flags.
    pub fn new(defaults: LookupdOptions) -> Self {
        Self {
            defaults,
            explicit: OptionsOverlay::default(),
        }
    }

    /// Flags given on the command line. These win over the config file.
    pub fn with_explicit_flags(mut self, explicit: OptionsOverlay) -> Self {
        self.explicit = explicit;
        self
    }

    /// Produce the options for one start.
    ///
    /// A config file that cannot be read or parsed is an error; so are
    /// resolved options that fail validation.
    pub fn resolve(&self, file: Option<&Path>) -> Result<LookupdOptions, ConfigError> {
        let mut opts = self.defaults.clone();

        if let Some(path) = file {
            let overlay = load_overlay(path)?;
            tracing::debug!(path = %path.display(), ?overlay, "Config file loaded");
            opts = opts.overlaid(&overlay);
        }

        if !self.explicit.is_empty() {
            opts = opts.overlaid(&self.explicit);
        }

        validate_options(&opts).map_err(ConfigError::Validation)?;
        Ok(opts)
    }
}

/// Resolve `defaults` against an optional config file.
pub fn resolve(defaults: LookupdOptions, file: Option<&Path>) -> Result<LookupdOptions, ConfigError> {
    ConfigResolver::new(defaults).resolve(file)
}

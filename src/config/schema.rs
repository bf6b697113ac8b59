//! Configuration schema definitions.
//!
//! `LookupdOptions` is the fully resolved value handed to the daemon.
//! `OptionsOverlay` carries a partial set of options, as read from a config
//! file or from flags given explicitly on the command line.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lifecycle::ShutdownWatchdog;

/// Resolved options for one daemon instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupdOptions {
    /// `<addr>:<port>` to listen on for TCP clients.
    pub tcp_address: String,

    /// `<addr>:<port>` to listen on for HTTP clients.
    pub http_address: String,

    /// Address this node advertises to clients. Unset means the listen host.
    pub broadcast_address: Option<String>,

    /// Seconds a producer stays in the active list since its last ping.
    pub inactive_producer_timeout_secs: u64,

    /// Seconds a producer stays tombstoned if registration remains.
    pub tombstone_lifetime_secs: u64,

    /// Seconds a graceful shutdown may take before the process is terminated.
    pub shutdown_timeout_secs: u64,

    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for LookupdOptions {
    fn default() -> Self {
        Self {
            tcp_address: "0.0.0.0:4160".to_string(),
            http_address: "0.0.0.0:4161".to_string(),
            broadcast_address: None,
            inactive_producer_timeout_secs: 300,
            tombstone_lifetime_secs: 45,
            shutdown_timeout_secs: ShutdownWatchdog::DEFAULT_DEADLINE.as_secs(),
            verbose: false,
        }
    }
}

impl LookupdOptions {
    /// Return new options with every field present in `overlay` replaced.
    pub fn overlaid(&self, overlay: &OptionsOverlay) -> Self {
        Self {
            tcp_address: overlay
                .tcp_address
                .clone()
                .unwrap_or_else(|| self.tcp_address.clone()),
            http_address: overlay
                .http_address
                .clone()
                .unwrap_or_else(|| self.http_address.clone()),
            broadcast_address: match &overlay.broadcast_address {
                Some(addr) if addr.is_empty() => None,
                Some(addr) => Some(addr.clone()),
                None => self.broadcast_address.clone(),
            },
            inactive_producer_timeout_secs: overlay
                .inactive_producer_timeout_secs
                .unwrap_or(self.inactive_producer_timeout_secs),
            tombstone_lifetime_secs: overlay
                .tombstone_lifetime_secs
                .unwrap_or(self.tombstone_lifetime_secs),
            shutdown_timeout_secs: overlay
                .shutdown_timeout_secs
                .unwrap_or(self.shutdown_timeout_secs),
            verbose: overlay.verbose.unwrap_or(self.verbose),
        }
    }

    pub fn inactive_producer_timeout(&self) -> Duration {
        Duration::from_secs(self.inactive_producer_timeout_secs)
    }

    pub fn tombstone_lifetime(&self) -> Duration {
        Duration::from_secs(self.tombstone_lifetime_secs)
    }

    /// Deadline enforced by the shutdown watchdog.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// A partial set of options. Absent fields leave the base value untouched.
///
/// Unknown keys are rejected so a misspelled option in a config file fails
/// loudly instead of silently keeping the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsOverlay {
    pub tcp_address: Option<String>,
    pub http_address: Option<String>,
    pub broadcast_address: Option<String>,
    pub inactive_producer_timeout_secs: Option<u64>,
    pub tombstone_lifetime_secs: Option<u64>,
    pub shutdown_timeout_secs: Option<u64>,
    pub verbose: Option<bool>,
}

impl OptionsOverlay {
    /// True when the overlay sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overlay_is_identity() {
        let base = LookupdOptions::default();
        assert_eq!(base.overlaid(&OptionsOverlay::default()), base);
    }

    #[test]
    fn test_overlay_replaces_only_present_fields() {
        let base = LookupdOptions::default();
        let overlay = OptionsOverlay {
            http_address: Some("127.0.0.1:9999".into()),
            tombstone_lifetime_secs: Some(5),
            ..Default::default()
        };

        let merged = base.overlaid(&overlay);
        assert_eq!(merged.http_address, "127.0.0.1:9999");
        assert_eq!(merged.tombstone_lifetime_secs, 5);
        assert_eq!(merged.tcp_address, base.tcp_address);
        assert_eq!(merged.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_empty_broadcast_address_clears_it() {
        let base = LookupdOptions {
            broadcast_address: Some("lookup-1.internal".into()),
            ..Default::default()
        };
        let overlay = OptionsOverlay {
            broadcast_address: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(base.overlaid(&overlay).broadcast_address, None);
    }

    #[test]
    fn test_duration_accessors() {
        let opts = LookupdOptions::default();
        assert_eq!(opts.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(opts.inactive_producer_timeout(), Duration::from_secs(300));
        assert_eq!(opts.tombstone_lifetime(), Duration::from_secs(45));
    }
}

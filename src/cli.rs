//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::config::OptionsOverlay;
use crate::lifecycle::StartRequest;

/// Flags for the `lookupd` binary.
///
/// Option flags carry no clap defaults so that only flags given explicitly
/// take precedence over the config file. Defaults come from
/// [`crate::config::LookupdOptions::default`].
#[derive(Debug, Parser)]
#[command(name = "lookupd")]
#[command(about = "Lookup daemon managed as a supervised service", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print version string
    #[arg(long)]
    pub version: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// <addr>:<port> to listen on for TCP clients [default: 0.0.0.0:4160]
    #[arg(long, value_name = "ADDR:PORT")]
    pub tcp_address: Option<String>,

    /// <addr>:<port> to listen on for HTTP clients [default: 0.0.0.0:4161]
    #[arg(long, value_name = "ADDR:PORT")]
    pub http_address: Option<String>,

    /// Address of this lookupd node [default: the listen host]
    #[arg(long, value_name = "ADDR")]
    pub broadcast_address: Option<String>,

    /// Seconds a producer remains in the active list since its last ping [default: 300]
    #[arg(long, value_name = "SECS")]
    pub inactive_producer_timeout_secs: Option<u64>,

    /// Seconds a producer remains tombstoned if registration remains [default: 45]
    #[arg(long, value_name = "SECS")]
    pub tombstone_lifetime_secs: Option<u64>,

    /// Seconds a graceful shutdown may take before the process exits [default: 30]
    #[arg(long, value_name = "SECS")]
    pub shutdown_timeout_secs: Option<u64>,
}

impl Cli {
    /// The options given explicitly on the command line.
    pub fn explicit_flags(&self) -> OptionsOverlay {
        OptionsOverlay {
            tcp_address: self.tcp_address.clone(),
            http_address: self.http_address.clone(),
            broadcast_address: self.broadcast_address.clone(),
            inactive_producer_timeout_secs: self.inactive_producer_timeout_secs,
            tombstone_lifetime_secs: self.tombstone_lifetime_secs,
            shutdown_timeout_secs: self.shutdown_timeout_secs,
            verbose: self.verbose.then_some(true),
        }
    }

    pub fn start_request(&self) -> StartRequest {
        StartRequest {
            config_path: self.config.clone(),
            flags: self.explicit_flags(),
            show_version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_means_empty_overlay() {
        let cli = Cli::try_parse_from(["lookupd"]).unwrap();
        assert!(cli.explicit_flags().is_empty());
        assert!(!cli.start_request().show_version);
    }

    #[test]
    fn test_explicit_flags() {
        let cli = Cli::try_parse_from([
            "lookupd",
            "--config",
            "/etc/lookupd.toml",
            "--tcp-address",
            "127.0.0.1:5160",
            "--shutdown-timeout-secs",
            "5",
            "--verbose",
        ])
        .unwrap();

        let request = cli.start_request();
        assert_eq!(request.config_path, Some(PathBuf::from("/etc/lookupd.toml")));
        assert_eq!(request.flags.tcp_address.as_deref(), Some("127.0.0.1:5160"));
        assert_eq!(request.flags.shutdown_timeout_secs, Some(5));
        assert_eq!(request.flags.verbose, Some(true));
        assert_eq!(request.flags.http_address, None);
    }

    #[test]
    fn test_version_flag() {
        let cli = Cli::try_parse_from(["lookupd", "--version"]).unwrap();
        assert!(cli.start_request().show_version);
    }
}

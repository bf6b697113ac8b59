//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate listen addresses (`host:port` with a numeric port)
//! - Validate value ranges (timeouts > 0)
//! - Detect conflicting listeners
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LookupdOptions → Result<(), Vec<ValidationError>>
//! - Runs before options are handed to the daemon

use thiserror::Error;

use crate::config::schema::LookupdOptions;

/// A single semantic problem with resolved options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: expected <addr>:<port>, got {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("tcp_address and http_address are both {0}")]
    ConflictingAddresses(String),
}

/// Check resolved options, collecting every violation.
pub fn validate_options(opts: &LookupdOptions) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("tcp_address", &opts.tcp_address),
        ("http_address", &opts.http_address),
    ] {
        if !is_host_port(value) {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    // Port 0 asks the OS for a fresh port, so equal strings don't collide.
    if opts.tcp_address == opts.http_address && !opts.tcp_address.ends_with(":0") {
        errors.push(ValidationError::ConflictingAddresses(opts.tcp_address.clone()));
    }

    for (field, secs) in [
        ("inactive_producer_timeout_secs", opts.inactive_producer_timeout_secs),
        ("tombstone_lifetime_secs", opts.tombstone_lifetime_secs),
        ("shutdown_timeout_secs", opts.shutdown_timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port`, where host may be empty (all interfaces) or bracketed IPv6.
fn is_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => {
            let host_ok = !host.contains(':') || (host.starts_with('[') && host.ends_with(']'));
            host_ok && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check endpoint URLs before any client is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AssetManagerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AssetManagerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than zero"));
    }
}

fn check_socket(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{}' is not a socket address", value),
        ));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AssetManagerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "listener.max_body_bytes",
            "must be greater than zero",
        ));
    }

    check_positive(
        &mut errors,
        "listener.drain_timeout_secs",
        config.listener.drain_timeout_secs,
    );

    check_url(&mut errors, "algod.url", &config.algod.url);
    check_positive(&mut errors, "algod.rpc_timeout_secs", config.algod.rpc_timeout_secs);
    check_positive(&mut errors, "algod.wait_timeout_secs", config.algod.wait_timeout_secs);

    check_url(&mut errors, "kmd.url", &config.kmd.url);
    check_positive(&mut errors, "kmd.rpc_timeout_secs", config.kmd.rpc_timeout_secs);

    if config.signing.wallet_name.trim().is_empty() {
        errors.push(ValidationError::new("signing.wallet_name", "must not be empty"));
    }
    if config.signing.mnemonic_env.trim().is_empty() {
        errors.push(ValidationError::new("signing.mnemonic_env", "must not be empty"));
    }

    check_positive(&mut errors, "confirmation.timeout_secs", config.confirmation.timeout_secs);
    if config.confirmation.query_retry_base_ms > config.confirmation.query_retry_max_ms {
        errors.push(ValidationError::new(
            "confirmation.query_retry_base_ms",
            "must not exceed query_retry_max_ms",
        ));
    }

    if config.observability.metrics_enabled {
        check_socket(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, address is `host:port`)
//! - Check path shapes (mount prefix, metrics path)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {address:?} is not host:port: {reason}")]
    BindAddress { address: String, reason: String },

    #[error("routing.mount_prefix {0:?} must start with '/' and not end with '/'")]
    MountPrefix(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_path {0:?} must start with '/'")]
    MetricsPath(String),
}

/// Why a bind address is not `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindAddressError {
    #[error("missing port")]
    MissingPort,

    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// Normalize a bind address to `host:port` without resolving the host.
///
/// `:8080` binds all interfaces. Hostnames are kept as-is and resolved
/// when the listener starts.
pub fn parse_bind_address(address: &str) -> Result<String, BindAddressError> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or(BindAddressError::MissingPort)?;
    let port: u16 = port
        .parse()
        .map_err(|_| BindAddressError::InvalidPort(port.to_string()))?;
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Ok(format!("{host}:{port}"))
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = parse_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::BindAddress {
            address: config.listener.bind_address.clone(),
            reason: e.to_string(),
        });
    }

    let prefix = &config.routing.mount_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::MountPrefix(prefix.clone()));
    }

    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_secs"));
    }
    if config.timeouts.write_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("write_secs"));
    }

    if config.observability.metrics_enabled && !config.observability.metrics_path.starts_with('/') {
        errors.push(ValidationError::MetricsPath(
            config.observability.metrics_path.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

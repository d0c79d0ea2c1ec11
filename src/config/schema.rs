//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shutdown bound used when none is configured.
pub const DEFAULT_SHUTDOWN_SECS: u64 = 5;

/// Root configuration for the router server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Mount prefix and scope depth.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Built-in health checks.
    pub health: HealthConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080" or ":8080").
    pub bind_address: String,

    /// Path to certificate file (PEM).
    pub cert_path: Option<String>,

    /// Path to private key file (PEM).
    pub key_path: Option<String>,
}

impl ListenerConfig {
    /// Certificate and key paths, only when both are set and non-empty.
    pub fn tls_paths(&self) -> Option<(&Path, &Path)> {
        let cert = self.cert_path.as_deref().filter(|p| !p.is_empty())?;
        let key = self.key_path.as_deref().filter(|p| !p.is_empty())?;
        Some((Path::new(cert), Path::new(key)))
    }

    /// True when exactly one of the two TLS paths is set.
    pub fn has_partial_tls(&self) -> bool {
        let cert = self.cert_path.as_deref().is_some_and(|p| !p.is_empty());
        let key = self.key_path.as_deref().is_some_and(|p| !p.is_empty());
        cert != key
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            cert_path: None,
            key_path: None,
        }
    }
}

/// Timeout configuration applied to the whole server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request body read timeout in seconds.
    pub read_secs: u64,

    /// Time allowed to produce a response, in seconds.
    pub write_secs: u64,

    /// Graceful shutdown bound in seconds. Unset means 5; 0 closes
    /// connections immediately.
    pub shutdown_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    /// `None` means hard close with no grace period.
    pub fn shutdown(&self) -> Option<Duration> {
        match self.shutdown_secs.unwrap_or(DEFAULT_SHUTDOWN_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 15,
            write_secs: 15,
            shutdown_secs: None,
        }
    }
}

/// Route matching configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Prefix under which the router is mounted (e.g., "/charts").
    /// Empty mounts at the root.
    pub mount_prefix: String,

    /// Number of path segments forming the scope identifier.
    pub scope_depth: usize,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log every request/response.
    pub access_log: bool,

    /// Mount the Prometheus metrics route.
    pub metrics_enabled: bool,

    /// Path of the metrics route.
    pub metrics_path: String,

    /// Mount the route listing at `/debug/routes`.
    pub route_listing: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            access_log: true,
            metrics_enabled: true,
            metrics_path: "/metrics".to_string(),
            route_listing: true,
        }
    }
}

/// Built-in health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Liveness fails once more runtime tasks than this are alive.
    pub task_threshold: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { task_threshold: 200 }
    }
}

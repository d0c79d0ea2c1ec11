//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    format!(
        "scope_router={level},router_cli={level},tower_http={level}",
        level = config.log_level
    )
}

/// Initialize the global tracing subscriber. Call once per process.
pub fn init_logging(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_configured_level() {
        let mut config = ObservabilityConfig::default();
        config.log_level = "debug".into();
        let filter = default_filter(&config);
        assert!(filter.contains("scope_router=debug"));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }
}

//! Startup assembly.
//!
//! # Responsibilities
//! - Build the server from validated configuration
//! - Register the default route groups in a fixed order
//!
//! # Design Decisions
//! - Collaborator groups are registered by the caller before `start`
//! - The route listing is filled in by [`finish`] once every group is in

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServerConfig;
use crate::handlers::{self, RouteListing};
use crate::health::{task_count_check, HealthRegistry, TASK_THRESHOLD_CHECK};
use crate::http::HttpServer;
use crate::observability::metrics;

/// A server with the default groups registered, plus the pending listing.
pub struct Assembled {
    pub server: HttpServer,
    listing: Option<RouteListing>,
}

impl Assembled {
    /// Freeze the route listing. Call after the last `add_routes`.
    pub fn finish(self) -> HttpServer {
        if let Some(listing) = self.listing {
            let _ = listing.set(self.server.route_summary());
        }
        tracing::info!(routes = self.server.routes().len(), "Route table ready");
        self.server
    }
}

/// Register `rt`, `health`, `metrics` (when a recorder is supplied) and
/// `diagnostics` (when enabled), in that order. The task-count liveness
/// check is added to `health`.
pub fn assemble(
    config: ServerConfig,
    metrics_handle: Option<PrometheusHandle>,
    health: &HealthRegistry,
) -> Assembled {
    let observability = config.observability.clone();
    let mount_prefix = config.routing.mount_prefix.clone();
    let mut server = HttpServer::new(config);

    server.add_routes("rt", handlers::default_routes(&observability, &mount_prefix));
    health.add_liveness_check(
        TASK_THRESHOLD_CHECK,
        task_count_check(server.config().health.task_threshold),
    );
    server.add_routes("health", health.routes());

    if let Some(handle) = metrics_handle {
        server.add_routes(
            "metrics",
            [metrics::metrics_route(&observability.metrics_path, handle)],
        );
    }

    let listing = observability.route_listing.then(|| {
        let listing = RouteListing::default();
        server.add_routes(
            "diagnostics",
            [handlers::route_listing_route(Arc::clone(&listing))],
        );
        listing
    });

    Assembled { server, listing }
}

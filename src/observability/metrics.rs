//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, status, action
//! - `router_request_duration_seconds` (histogram): latency by method, action
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder it is a no-op, so tests need no setup
//! - The Prometheus render output is served as an ordinary route

use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::routing::{self, HttpRoute};

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, action: &str, start_time: Instant) {
    metrics::counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "action" => action.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "router_request_duration_seconds",
        "method" => method.to_string(),
        "action" => action.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}

/// Install the process-wide Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// `GET <path>` rendering the recorder's current snapshot.
pub fn metrics_route(path: &str, handle: PrometheusHandle) -> HttpRoute {
    routing::get(path, move || {
        let handle = handle.clone();
        async move { handle.render() }
    })
    .with_action("metrics")
}

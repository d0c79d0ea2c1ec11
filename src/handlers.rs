//! Default application routes: index page, version, route listing.

use std::sync::{Arc, OnceLock};

use axum::{response::Html, Json};
use serde::Serialize;

use crate::config::ObservabilityConfig;
use crate::health::{LIVE_PATH, READY_PATH};
use crate::routing::{self, HttpRoute, Route, RouteTable};

pub const VERSION_PATH: &str = "/version";
pub const ROUTES_PATH: &str = "/debug/routes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub method: String,
    pub path: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub routes: Vec<RouteSummary>,
}

/// Snapshot of a route table for diagnostics.
pub fn summarize<H>(table: &RouteTable<H>) -> Vec<GroupSummary> {
    table
        .groups()
        .map(|(group, routes)| GroupSummary {
            group: group.to_string(),
            routes: routes.into_iter().map(summarize_route).collect(),
        })
        .collect()
}

fn summarize_route<H>(route: &Route<H>) -> RouteSummary {
    RouteSummary {
        method: route.method.to_string(),
        path: route.path().to_string(),
        action: route.action.clone(),
    }
}

/// Rendered with links to the pages this configuration serves, each
/// under `mount_prefix`.
pub fn index_page(observability: &ObservabilityConfig, mount_prefix: &str) -> String {
    let mut links = Vec::new();
    if observability.metrics_enabled {
        links.push((observability.metrics_path.as_str(), "metrics"));
    }
    links.push((LIVE_PATH, "live"));
    links.push((READY_PATH, "ready"));
    links.push((VERSION_PATH, "version"));
    if observability.route_listing {
        links.push((ROUTES_PATH, "routes"));
    }

    let items: String = links
        .iter()
        .map(|(href, label)| format!("<li><a href='{mount_prefix}{href}'>{label}</a></li>"))
        .collect();

    format!(
        "<html><head><title>Server</title></head><body><h1>Welcome Server</h1><ul>{items}</ul></body></html>"
    )
}

/// `GET /` and `GET /version`.
pub fn default_routes(observability: &ObservabilityConfig, mount_prefix: &str) -> Vec<HttpRoute> {
    let page = Arc::new(index_page(observability, mount_prefix));
    vec![
        routing::get("/", move || {
            let page = Arc::clone(&page);
            async move { Html(page.as_str().to_owned()) }
        })
        .with_action("index"),
        routing::get(VERSION_PATH, get_version).with_action("version"),
    ]
}

/// Shared slot for the listing, filled once every group is registered.
pub type RouteListing = Arc<OnceLock<Vec<GroupSummary>>>;

/// `GET /debug/routes`. Serves an empty list until `listing` is set.
pub fn route_listing_route(listing: RouteListing) -> HttpRoute {
    routing::get(ROUTES_PATH, move || {
        let listing = Arc::clone(&listing);
        async move { Json(listing.get().cloned().unwrap_or_default()) }
    })
    .with_action("routes")
}

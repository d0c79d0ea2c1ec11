//! Liveness and readiness checks.
//!
//! # Data Flow
//! ```text
//! Collaborators register named checks
//!     → GET /live  runs liveness checks
//!     → GET /ready runs readiness + liveness checks
//!     → 200 when all pass, 503 otherwise
//! ```
//!
//! # Design Decisions
//! - Probes only care about the status code, so the body is `"OK"` unless
//!   `?full=true` asks for per-check results
//! - Checks can be added while the server runs; the lock is only held to
//!   run them

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::routing::{self, HttpRoute};

pub const LIVE_PATH: &str = "/live";
pub const READY_PATH: &str = "/ready";

/// Name of the built-in liveness check on the runtime task count.
pub const TASK_THRESHOLD_CHECK: &str = "task_threshold";

/// A health or readiness check.
pub type Check = Arc<dyn Fn() -> Result<(), String> + Send + Sync>;

#[derive(Default)]
struct Checks {
    liveness: HashMap<String, Check>,
    readiness: HashMap<String, Check>,
}

/// Registry of named checks backing the probe routes.
#[derive(Clone, Default)]
pub struct HealthRegistry {
    checks: Arc<RwLock<Checks>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProbeQuery {
    full: Option<String>,
}

impl ProbeQuery {
    fn wants_full(&self) -> bool {
        self.full.as_deref().is_some_and(|v| v != "false")
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_liveness_check<F>(&self, name: &str, check: F)
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        self.write().liveness.insert(name.to_string(), Arc::new(check));
    }

    pub fn add_readiness_check<F>(&self, name: &str, check: F)
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        self.write().readiness.insert(name.to_string(), Arc::new(check));
    }

    // Map inserts never leave a half-written entry, so a poisoned lock is
    // still usable.
    fn write(&self) -> RwLockWriteGuard<'_, Checks> {
        self.checks.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Checks> {
        self.checks.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run liveness checks only.
    pub fn live(&self) -> (StatusCode, BTreeMap<String, String>) {
        self.evaluate(false)
    }

    /// Run readiness and liveness checks.
    pub fn ready(&self) -> (StatusCode, BTreeMap<String, String>) {
        self.evaluate(true)
    }

    fn evaluate(&self, readiness: bool) -> (StatusCode, BTreeMap<String, String>) {
        let mut status = StatusCode::OK;
        let mut results = BTreeMap::new();

        let checks = self.read();

        let groups = if readiness {
            vec![&checks.readiness, &checks.liveness]
        } else {
            vec![&checks.liveness]
        };

        for group in groups {
            for (name, check) in group {
                match check() {
                    Ok(()) => {
                        results.insert(name.clone(), "OK".to_string());
                    }
                    Err(e) => {
                        tracing::warn!(check = %name, error = %e, "Health check failed");
                        status = StatusCode::SERVICE_UNAVAILABLE;
                        results.insert(name.clone(), e);
                    }
                }
            }
        }

        (status, results)
    }

    /// `GET /live` and `GET /ready`.
    pub fn routes(&self) -> Vec<HttpRoute> {
        let live = self.clone();
        let ready = self.clone();
        vec![
            routing::get(LIVE_PATH, move |Query(query): Query<ProbeQuery>| {
                let registry = live.clone();
                async move { probe_response(registry.live(), &query) }
            })
            .with_action("live"),
            routing::get(READY_PATH, move |Query(query): Query<ProbeQuery>| {
                let registry = ready.clone();
                async move { probe_response(registry.ready(), &query) }
            })
            .with_action("ready"),
        ]
    }
}

/// Fails when more than `threshold` tasks are alive on the current
/// runtime. Outside a runtime there is nothing to count.
pub fn task_count_check(threshold: usize) -> impl Fn() -> Result<(), String> + Send + Sync + 'static {
    move || {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return Ok(());
        };
        check_task_count(handle.metrics().num_alive_tasks(), threshold)
    }
}

fn check_task_count(count: usize, threshold: usize) -> Result<(), String> {
    if count > threshold {
        Err(format!("too many tasks ({count} > {threshold})"))
    } else {
        Ok(())
    }
}

fn probe_response((status, results): (StatusCode, BTreeMap<String, String>), query: &ProbeQuery) -> Response {
    if !query.wants_full() {
        return (status, Json("OK")).into_response();
    }

    match serde_json::to_string_pretty(&results) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};

    async fn call(route: &HttpRoute, uri: &str) -> (StatusCode, String) {
        let res = route
            .handler
            .call(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn empty_registry_is_healthy() {
        let registry = HealthRegistry::new();
        assert_eq!(registry.live().0, StatusCode::OK);
        assert_eq!(registry.ready().0, StatusCode::OK);
    }

    #[test]
    fn readiness_includes_liveness() {
        let registry = HealthRegistry::new();
        registry.add_liveness_check("tasks", || Ok(()));
        registry.add_readiness_check("cache", || Err("cache not synced".to_string()));

        let (status, results) = registry.live();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results.len(), 1);

        let (status, results) = registry.ready();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(results["tasks"], "OK");
        assert_eq!(results["cache"], "cache not synced");
    }

    #[tokio::test]
    async fn probe_bodies() {
        let registry = HealthRegistry::new();
        registry.add_liveness_check("tasks", || Ok(()));
        let routes = registry.routes();
        assert_eq!(routes[0].path(), LIVE_PATH);
        assert_eq!(routes[1].path(), READY_PATH);

        let (status, body) = call(&routes[0], "/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "\"OK\"");

        let (_, body) = call(&routes[0], "/live?full=false").await;
        assert_eq!(body, "\"OK\"");

        let (_, body) = call(&routes[0], "/live?full=true").await;
        let parsed: BTreeMap<String, String> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["tasks"], "OK");
        assert!(body.contains('\n'));
    }

    #[test]
    fn registration_survives_poisoned_lock() {
        let registry = HealthRegistry::new();
        let checks = Arc::clone(&registry.checks);
        let _ = std::thread::spawn(move || {
            let _guard = checks.write().unwrap();
            panic!("check registration panicked");
        })
        .join();
        assert!(registry.checks.is_poisoned());

        registry.add_liveness_check("late", || Err("down".to_string()));
        let (status, results) = registry.live();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(results["late"], "down");
    }

    #[test]
    fn task_count_against_threshold() {
        assert!(check_task_count(200, 200).is_ok());
        assert_eq!(
            check_task_count(201, 200),
            Err("too many tasks (201 > 200)".to_string())
        );
    }

    #[tokio::test]
    async fn task_threshold_fails_liveness() {
        let parked = tokio::spawn(std::future::pending::<()>());
        let registry = HealthRegistry::new();
        registry.add_liveness_check(TASK_THRESHOLD_CHECK, task_count_check(0));

        let (status, results) = registry.live();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(results[TASK_THRESHOLD_CHECK].starts_with("too many tasks"));

        parked.abort();
        registry.add_liveness_check(TASK_THRESHOLD_CHECK, task_count_check(10_000));
        assert_eq!(registry.live().0, StatusCode::OK);
    }

    #[tokio::test]
    async fn failing_check_after_routes_built() {
        let registry = HealthRegistry::new();
        let routes = registry.routes();
        registry.add_readiness_check("db", || Err("down".to_string()));

        let (status, body) = call(&routes[1], "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "\"OK\"");

        let (status, _) = call(&routes[0], "/live").await;
        assert_eq!(status, StatusCode::OK);
    }
}

//! End-to-end requests through an assembled server.

use scope_router::health::HealthRegistry;
use scope_router::http::{JsonBody, X_REQUEST_ID};
use scope_router::lifecycle::assemble;
use scope_router::routing::{self, PathParams};
use serde_json::Value;

mod common;

async fn start(health: &HealthRegistry) -> common::TestServer {
    let mut config = common::test_config();
    config.routing.scope_depth = 2;
    config.routing.mount_prefix = "/charts".into();

    let mut assembled = assemble(config, None, health);
    assembled.server.add_routes(
        "charts",
        vec![
            routing::get("/api/:repo/charts/:name", |params: PathParams| async move {
                format!(
                    "{} in {}",
                    params.get("name").unwrap_or_default(),
                    params.get("repo").unwrap_or_default()
                )
            }),
            routing::post("/scheduler/filter", |JsonBody(body): JsonBody<Value>| async move {
                axum::Json(body)
            })
            .with_action("filter"),
        ],
    );
    common::spawn_server(assembled.finish()).await
}

#[tokio::test]
async fn test_default_routes_under_mount() {
    let health = HealthRegistry::new();
    let running = start(&health).await;
    let client = reqwest::Client::new();

    let index = client.get(running.url("/charts")).send().await.unwrap();
    assert_eq!(index.status(), 200);
    let page = index.text().await.unwrap();

    let links: Vec<&str> = page
        .split("href='")
        .skip(1)
        .filter_map(|rest| rest.split('\'').next())
        .collect();
    assert!(links.contains(&"/charts/version"));
    for link in links {
        let res = client.get(running.url(link)).send().await.unwrap();
        assert_eq!(res.status(), 200, "link {link}");
    }

    let version: Value = client
        .get(running.url("/charts/version"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));

    let routes: Value = client
        .get(running.url("/charts/debug/routes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let groups: Vec<&str> = routes
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["group"].as_str().unwrap())
        .collect();
    assert_eq!(groups, ["rt", "health", "diagnostics", "charts"]);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_scoped_api_route() {
    let health = HealthRegistry::new();
    let running = start(&health).await;

    let res = reqwest::get(running.url("/charts/api/org/team/charts/nginx")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "nginx in org/team");

    // Artifact paths under /api/ are not API routes.
    let res = reqwest::get(running.url("/charts/api/org/team/charts/nginx.tgz")).await.unwrap();
    assert_eq!(res.status(), 404);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_not_found_body_and_request_id() {
    let health = HealthRegistry::new();
    let running = start(&health).await;
    let client = reqwest::Client::new();

    let res = client
        .get(running.url("/charts/nowhere"))
        .header(X_REQUEST_ID, "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()[X_REQUEST_ID], "trace-me");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["Method"], "GET");
    assert_eq!(body["Path"], "/charts/nowhere");
    assert_eq!(body["error"], "router not found");

    let res = client.get(running.url("/charts/nowhere")).send().await.unwrap();
    let generated = res.headers()[X_REQUEST_ID].to_str().unwrap();
    assert_eq!(generated.len(), 36);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_health_probes() {
    let health = HealthRegistry::new();
    let running = start(&health).await;
    let client = reqwest::Client::new();

    let res = client.get(running.url("/charts/ready")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "\"OK\"");

    health.add_readiness_check("informer", || Err("not synced".into()));
    let res = client.get(running.url("/charts/ready?full=1")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["informer"], "not synced");

    let res = client.get(running.url("/charts/live")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_json_body_rejection() {
    let health = HealthRegistry::new();
    let running = start(&health).await;
    let client = reqwest::Client::new();

    let res = client
        .post(running.url("/charts/scheduler/filter"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "unable to read request body");

    let res = client
        .post(running.url("/charts/scheduler/filter"))
        .json(&serde_json::json!({"nodes": ["a", "b"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["nodes"][1], "b");

    running.stop().await.unwrap();
}

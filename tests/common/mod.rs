//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use scope_router::config::ServerConfig;
use scope_router::http::{HttpServer, ServerError, ServerState};
use scope_router::lifecycle::Shutdown;

/// A server started on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub server: Arc<HttpServer>,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for `start` to return.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("server did not stop")
            .expect("server task panicked")
    }
}

/// Loopback, ephemeral port, no access log.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.observability.access_log = false;
    config.observability.metrics_enabled = false;
    config
}

/// Spawn `start` and wait until the listener reports its bound address.
pub async fn spawn_server(server: HttpServer) -> TestServer {
    let server = Arc::new(server);
    let shutdown = Shutdown::new();
    let mut state = server.subscribe_state();

    let task = {
        let server = Arc::clone(&server);
        let signal = shutdown.subscribe();
        tokio::spawn(async move { server.start(signal.recv()).await })
    };

    let reached = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| matches!(s, ServerState::Listening(_) | ServerState::Failed)),
    )
    .await
    .expect("server did not start listening")
    .map(|s| *s)
    .expect("state channel closed");

    let ServerState::Listening(addr) = reached else {
        panic!("server failed to start: {:?}", reached);
    };

    TestServer {
        addr,
        server,
        shutdown,
        task,
    }
}

//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Own the route table and dispatch every request through the matcher
//! - Wire up middleware (request context, timeouts, access log)
//! - Bind plain or TLS listener on a background task
//! - Block in `start` until cancellation or listener failure
//! - Bounded graceful shutdown, hard close when the bound is exceeded
//!
//! # Lifecycle
//! ```text
//! Idle → Listening → ShuttingDown → Stopped
//!            └──────────────────→ Failed
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::config::{parse_bind_address, BindAddressError, RoutingConfig, ServerConfig};
use crate::handlers::{summarize, GroupSummary};
use crate::http::request::{request_context, RequestContext, RequestCounter};
use crate::http::response::not_found;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::routing::{match_route, BoxedHandler, HttpRoute, MatchRequest, RouteMatch, RouteTable};

/// Terminal errors reported by [`HttpServer::start`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: BindAddressError,
    },

    #[error("failed to resolve bind address {address:?}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load TLS certificate/key: {0}")]
    Tls(#[source] std::io::Error),

    #[error("listener error: {0}")]
    Listener(#[source] std::io::Error),

    #[error("listener task failed: {0}")]
    ListenerTask(#[source] JoinError),

    #[error("graceful shutdown did not finish within {0:?}, connections closed")]
    ShutdownTimeout(Duration),
}

/// Where a server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Listening(SocketAddr),
    ShuttingDown,
    Stopped,
    Failed,
}

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable<BoxedHandler>>,
    pub routing: RoutingConfig,
}

/// HTTP server owning the route table.
pub struct HttpServer {
    config: ServerConfig,
    table: RouteTable<BoxedHandler>,
    counter: RequestCounter,
    state: Arc<watch::Sender<ServerState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let (state, _) = watch::channel(ServerState::Idle);
        Self {
            config,
            table: RouteTable::new(),
            counter: RequestCounter::new(),
            state: Arc::new(state),
        }
    }

    /// Append routes under `group`. Must happen before [`start`](Self::start).
    pub fn add_routes(&mut self, group: &str, routes: impl IntoIterator<Item = HttpRoute>) {
        tracing::debug!(group = %group, "Loading route group");
        self.table.register(group, routes);
    }

    pub fn routes(&self) -> &RouteTable<BoxedHandler> {
        &self.table
    }

    /// Group-by-group listing of the registered routes.
    pub fn route_summary(&self) -> Vec<GroupSummary> {
        summarize(&self.table)
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn request_counter(&self) -> &RequestCounter {
        &self.counter
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions, e.g. to learn the bound address.
    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The route table is snapshotted; routes added afterwards are not
    /// served by the returned router.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let state = AppState {
            table: Arc::new(self.table.clone()),
            routing: self.config.routing.clone(),
        };

        let router = Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(RequestBodyTimeoutLayer::new(self.config.timeouts.read()))
            .layer(TimeoutLayer::new(self.config.timeouts.write()))
            .layer(middleware::from_fn_with_state(
                self.counter.clone(),
                request_context,
            ));

        if self.config.observability.access_log {
            router.layer(TraceLayer::new_for_http())
        } else {
            router
        }
    }

    /// Serve until `shutdown` resolves or the listener fails.
    ///
    /// Returns the terminal error, if any. Process-level consequences are
    /// left to the caller.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        self.state.send_replace(ServerState::Idle);

        let result = self.run(shutdown).await;
        match &result {
            Ok(()) => {
                self.state.send_replace(ServerState::Stopped);
                tracing::info!("Server exiting");
            }
            Err(e) => {
                self.state.send_replace(ServerState::Failed);
                tracing::error!(error = %e, "Server stopped with error");
            }
        }
        result
    }

    async fn run<F>(&self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let listener_config = &self.config.listener;
        let addr = resolve_bind_address(&listener_config.bind_address).await?;

        if listener_config.has_partial_tls() {
            tracing::warn!("Only one of cert_path/key_path is set, serving plaintext");
        }

        let tls = match listener_config.tls_paths() {
            Some((cert, key)) => match load_tls_config(cert, key).await {
                Ok(tls) => Some(tls),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load TLS key pair");
                    return Err(ServerError::Tls(e));
                }
            },
            None => None,
        };

        let handle = Handle::new();
        self.watch_listening(handle.clone(), tls.is_some());

        let app = self.router();
        let mut listener = tokio::spawn(serve(addr, tls, app, handle.clone()));

        tokio::pin!(shutdown);
        tokio::select! {
            () = &mut shutdown => {}
            joined = &mut listener => return listener_outcome(joined),
        }

        self.shutdown(&handle, listener).await
    }

    async fn shutdown(
        &self,
        handle: &Handle,
        mut listener: JoinHandle<std::io::Result<()>>,
    ) -> Result<(), ServerError> {
        self.state.send_replace(ServerState::ShuttingDown);
        tracing::info!(
            address = %self.config.listener.bind_address,
            "Shutting down the server..."
        );

        let Some(bound) = self.config.timeouts.shutdown() else {
            handle.shutdown();
            return listener_outcome(listener.await);
        };

        handle.graceful_shutdown(None);
        match tokio::time::timeout(bound, &mut listener).await {
            Ok(joined) => listener_outcome(joined),
            Err(_) => {
                tracing::warn!(timeout = ?bound, "Graceful shutdown timed out, closing connections");
                handle.shutdown();
                if let Ok(Err(e)) = listener.await {
                    tracing::error!(error = %e, "Listener error during forced close");
                }
                Err(ServerError::ShutdownTimeout(bound))
            }
        }
    }

    fn watch_listening(&self, handle: Handle, tls: bool) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let Some(addr) = handle.listening().await else {
                return;
            };
            let scheme = if tls { "https" } else { "http" };
            tracing::info!(address = %addr, "Listening on {}://{}", scheme, addr);
            state.send_if_modified(|current| {
                if *current == ServerState::Idle {
                    *current = ServerState::Listening(addr);
                    true
                } else {
                    false
                }
            });
        });
    }
}

/// Resolve `host:port`, preferring an IPv4 address when the host has both.
async fn resolve_bind_address(address: &str) -> Result<SocketAddr, ServerError> {
    let normalized = parse_bind_address(address).map_err(|source| ServerError::InvalidAddress {
        address: address.to_string(),
        source,
    })?;

    let resolve_error = |source| ServerError::Resolve {
        address: address.to_string(),
        source,
    };
    let candidates: Vec<SocketAddr> = tokio::net::lookup_host(normalized.as_str())
        .await
        .map_err(resolve_error)?
        .collect();

    candidates
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| {
            resolve_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses found",
            ))
        })
}

async fn serve(
    addr: SocketAddr,
    tls: Option<RustlsConfig>,
    app: Router,
    handle: Handle,
) -> std::io::Result<()> {
    let service = app.into_make_service();
    let result = match tls {
        Some(tls) => {
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(service)
                .await
        }
        None => axum_server::bind(addr).handle(handle).serve(service).await,
    };

    if let Err(e) = &result {
        tracing::error!(address = %addr, error = %e, "Http server error");
    }
    result
}

fn listener_outcome(joined: Result<std::io::Result<()>, JoinError>) -> Result<(), ServerError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ServerError::Listener(e)),
        Err(e) => Err(ServerError::ListenerTask(e)),
    }
}

/// Matches the request against the route table and invokes the handler,
/// or answers with the structured 404.
async fn dispatch_handler(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let matched = match_route(
        state.table.routes(),
        &MatchRequest {
            method: &method,
            path: &path,
            mount_prefix: &state.routing.mount_prefix,
            scope_depth: state.routing.scope_depth,
        },
    );

    let Some(RouteMatch { route, params }) = matched else {
        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "No route matched"
        );
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return not_found(&method, &path);
    };

    let action = if route.action.is_empty() {
        route.path().to_string()
    } else {
        route.action.clone()
    };
    let handler = route.handler.clone();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        action = %action,
        params = ?params,
        "Route matched"
    );

    request.extensions_mut().insert(params);
    let response = handler.call(request).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), &action, start_time);
    response
}

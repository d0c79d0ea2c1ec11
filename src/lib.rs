//! Scope-aware HTTP router.
//!
//! Route groups are matched against literal paths and against paths whose
//! resource identity is a variable-depth scope prefix (`/:repo/...`), then
//! served by a single axum fallback dispatcher with a bounded graceful
//! shutdown.
//!
//! ```text
//!     Client Request
//!     ───────────────▶ request context ──▶ matcher ──▶ route handler
//!                      (seq + request id)     │
//!                                             └──▶ 404 fallback
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Default routes
pub mod handlers;
pub mod health;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{HttpServer, ServerError, ServerState};
pub use lifecycle::Shutdown;
pub use routing::{PathParams, RouteTable};

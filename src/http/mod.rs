//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum setup, timeouts, access log)
//!     → request.rs (sequence number, request ID)
//!     → server.rs dispatcher (matcher → route handler)
//!     → response.rs (structured 404 / error envelopes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, RequestCounter, X_REQUEST_ID};
pub use response::{not_found, ErrorResponse, JsonBody};
pub use server::{HttpServer, ServerError, ServerState};

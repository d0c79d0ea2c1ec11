//! Request context tagging.
//!
//! # Responsibilities
//! - Number every request from a per-server atomic counter
//! - Reuse the caller's `X-Request-Id` or generate a UUID v4
//! - Expose both to handlers as a [`RequestContext`] extension
//! - Echo the correlation id on the response
//!
//! # Design Decisions
//! - Counter belongs to the server instance, not the process
//! - Lock-free: one `fetch_add` per request
//! - Request ID added as early as possible for tracing

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Correlation header read from requests and written to responses.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Monotonic request sequence shared by every connection of one server.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new value. The first call returns 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of requests seen so far.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-request values attached by [`request_context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Decimal sequence number of this request.
    pub sequence: String,
    pub request_id: String,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Middleware tagging each request with its sequence number and
/// correlation id.
pub async fn request_context(
    State(counter): State<RequestCounter>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let sequence = counter.next().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestContext {
        sequence,
        request_id: request_id.clone(),
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

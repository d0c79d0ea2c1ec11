//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Listener configuration
//!     → tls.rs (optional certificate/key loading)
//!     → axum-server bind (plain or rustls)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS only when both certificate and key are configured
//! - Bad TLS material is fatal before any socket is bound

pub mod tls;

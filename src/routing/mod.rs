//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     group + Route[]
//!     → pattern.rs (split paths into tagged segments once)
//!     → table.rs (append under group, keep order)
//!
//! Incoming Request (method, path)
//!     → matcher.rs (mount prefix, API detection, scope extraction)
//!     → Return: matched Route + PathParams, or no match
//! ```
//!
//! # Design Decisions
//! - Routes registered before start, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod table;

pub use matcher::{match_route, MatchRequest, RouteMatch};
pub use pattern::{PathPattern, Segment, SCOPE_PARAM};
pub use route::{any, delete, get, post, BoxedHandler, HttpRoute, Method, PathParams, Route};
pub use table::RouteTable;

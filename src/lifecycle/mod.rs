//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → default route groups → caller groups → finish
//!
//! Shutdown (shutdown.rs):
//!     trigger() → ShutdownSignal resolves → HttpServer::start drains
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger()
//! ```
//!
//! # Design Decisions
//! - Listeners start last (traffic only when the table is complete)
//! - Shutdown has a bound: connections are closed after the deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::spawn_signal_handler;
pub use startup::{assemble, Assembled};

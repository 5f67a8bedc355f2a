//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Connect channel → Spawn serializer → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Serializer finishes in-flight call,
//!     fails queued calls → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the backend channel, then the listener
//! - The serializer outlives the listener so in-flight callers get an answer

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Backend round trip:
//!     → timeouts.rs (optional bound on waiting for the reply)
//!     → On failure: serializer drains the queue and marks the channel unavailable
//!     → backoff.rs (delay between automatic reconnect attempts)
//! ```
//!
//! # Design Decisions
//! - Requests are never retried; the gateway cannot assume backend actions are idempotent
//! - Only the connection is retried, and only when reconnect is enabled
//! - A timed-out reply is a channel failure, since the late reply would
//!   otherwise be delivered to the next caller

pub mod backoff;
pub mod timeouts;

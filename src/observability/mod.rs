//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP surface, gateway and serializer produce:
//!     → logging.rs (structured log events, request id on every HTTP span)
//!     → metrics.rs (call counters, latency histogram, queue depth)
//!
//! Consumers:
//!     → stdout (pretty or compact)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`action`, `queued`, `elapsed_ms`) instead of formatted strings
//! - Metric updates are no-ops until a recorder is installed, so tests need no setup

pub mod logging;
pub mod metrics;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request id, per-request span)
//!     → actions.rs (parse optional JSON body, call the gateway)
//!     → response.rs (pass reply through, or map failure to status)
//!     → Send to client
//! ```

pub mod actions;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

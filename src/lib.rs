//! Trainer gateway library.
//!
//! Bridges a concurrent HTTP surface to a trainer backend that only speaks
//! strict request-reply over a ZeroMQ socket.

pub mod admin;
pub mod channel;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod protocol;
pub mod resilience;

pub use channel::{Serializer, SerializerHandle, ZmqChannel};
pub use config::GatewayConfig;
pub use gateway::{Gateway, GatewayError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;

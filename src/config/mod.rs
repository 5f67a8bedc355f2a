//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the HTTP surface; copied into the serializer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changing the backend address means a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AdminConfig, BackendConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ReconnectConfig, SecurityConfig, SerializerConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses parse and value ranges are usable
//! - Refuse an admin API guarded by the placeholder key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::{GatewayConfig, PLACEHOLDER_API_KEY};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    // Hostnames are allowed here; ZeroMQ resolves them at connect time.
    match config.backend.address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
        _ => errors.push(ValidationError::new(
            "backend.address",
            format!("`{}` must be host:port", config.backend.address),
        )),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.reply_timeout_ms == Some(0) {
        errors.push(ValidationError::new(
            "timeouts.reply_timeout_ms",
            "must be greater than 0 when set",
        ));
    }

    if config.serializer.queue_capacity == 0 {
        errors.push(ValidationError::new("serializer.queue_capacity", "must be greater than 0"));
    }

    if config.reconnect.enabled {
        if config.reconnect.base_delay_ms > config.reconnect.max_delay_ms {
            errors.push(ValidationError::new(
                "reconnect.base_delay_ms",
                "must not exceed reconnect.max_delay_ms",
            ));
        }
        if config.reconnect.max_attempts == 0 {
            errors.push(ValidationError::new("reconnect.max_attempts", "must be greater than 0"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled
        && (config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY)
    {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be set to a real key when the admin API is enabled",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }
    if let Some(origin) = &config.security.cors_allow_origin {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "security.cors_allow_origin",
                "is not a valid header value",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.backend.address = "localhost".into();
        config.serializer.queue_capacity = 0;
        config.timeouts.reply_timeout_ms = Some(0);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "backend.address",
                "timeouts.reply_timeout_ms",
                "serializer.queue_capacity",
            ]
        );
    }

    #[test]
    fn backend_hostnames_are_accepted() {
        let mut config = GatewayConfig::default();
        config.backend.address = "trainer.internal:8888".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn admin_requires_a_real_key() {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        assert!(validate_config(&config).is_err());

        config.admin.api_key = "s3cret".into();
        assert!(validate_config(&config).is_ok());
    }
}

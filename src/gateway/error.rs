//! Gateway failure taxonomy.

use thiserror::Error;

use crate::channel::{CallError, ChannelError};
use crate::protocol::ProtocolError;

/// Why a submitted call produced no reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Action name not recognized; rejected before reaching the channel.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Payload unusable for the action; rejected before reaching the channel.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The call was in flight when the backend channel failed.
    #[error("backend channel error: {0}")]
    Channel(ChannelError),

    /// The call was not sent because the channel is down or shutting down.
    #[error("backend channel unavailable")]
    ChannelUnavailable,
}

impl GatewayError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidAction(_) => "invalid_action",
            GatewayError::InvalidPayload(_) => "invalid_payload",
            GatewayError::Channel(ChannelError::Decode(_)) => "decode_error",
            GatewayError::Channel(ChannelError::Timeout(_)) => "channel_timeout",
            GatewayError::Channel(_) => "channel_error",
            GatewayError::ChannelUnavailable => "channel_unavailable",
        }
    }
}

impl From<ProtocolError> for GatewayError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::UnknownAction(name) => GatewayError::InvalidAction(name),
            ProtocolError::InvalidPayload(reason) => GatewayError::InvalidPayload(reason),
        }
    }
}

impl From<CallError> for GatewayError {
    fn from(error: CallError) -> Self {
        match error {
            CallError::Channel(e) => GatewayError::Channel(e),
            CallError::Unavailable => GatewayError::ChannelUnavailable,
        }
    }
}

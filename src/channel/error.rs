//! Channel and serializer error types.

use std::time::Duration;

use thiserror::Error;

/// Transport-level failure on the backend channel.
///
/// Any of these leaves the request/reply alternation in an unknown state,
/// so the serializer stops using the channel until it is reconnected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Could not establish the backend connection.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Send or receive failed on an established connection.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request could not be encoded for the wire.
    #[error("encode error: {0}")]
    Encode(String),

    /// Reply could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No reply arrived within the configured bound.
    #[error("no reply within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Send while a reply is owed, or receive with no request outstanding.
    #[error("out of sequence: {0}")]
    OutOfSequence(&'static str),
}

/// Terminal failure of one pending call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The call was in flight when the channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The call was never sent: the channel had failed, was awaiting
    /// reconnect, or the serializer was shutting down.
    #[error("backend channel unavailable")]
    Unavailable,
}

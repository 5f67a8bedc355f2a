//! Backend channel subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway::submit (many concurrent callers)
//!     → SerializerHandle::call (admit PendingCall to the FIFO queue)
//!     → Serializer task (single owner of the channel)
//!         → Channel::send (one frame)
//!         → Channel::recv (exactly one reply)
//!         → complete the head call's oneshot slot
//!     → caller resumes with Reply or CallError
//! ```
//!
//! # Design Decisions
//! - The backend has no correlation id, so replies are matched to callers
//!   by position: strict FIFO, one request outstanding, never reordered
//! - Only the serializer task touches the channel and the queue
//! - A channel failure drains the queue instead of advancing, since the
//!   alternation state is no longer known

pub mod error;
pub mod serializer;
pub mod state;
pub mod zmq;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use error::{CallError, ChannelError};
pub use serializer::{Serializer, SerializerHandle, SerializerOptions};
pub use state::{CallState, ChannelState, StatsSnapshot};
pub use zmq::ZmqChannel;

/// A strict request-reply connection to the backend.
///
/// Implementations may assume calls alternate `send`, `recv`, `send`, ...;
/// the serializer guarantees it. They should still refuse out-of-order use
/// with [`ChannelError::OutOfSequence`].
#[async_trait]
pub trait Channel: Send + 'static {
    /// Transmit one encoded request.
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ChannelError>;

    /// Receive the reply to the request last sent.
    async fn recv(&mut self) -> Result<Vec<u8>, ChannelError>;

    /// Replace the underlying connection, discarding any owed reply.
    async fn reconnect(&mut self) -> Result<(), ChannelError>;

    /// Human-readable peer address for logs.
    fn endpoint(&self) -> &str;
}

//! Backend wire protocol.
//!
//! # Data Flow
//! ```text
//! caller (action name + optional JSON payload)
//!     → action.rs (parse enumerated tag, reject unknown names)
//!     → request.rs (normalize payload fields, encode as one JSON text frame)
//!     → [channel serializer sends frame, awaits exactly one reply]
//!     → reply.rs (validate reply text, hand back to caller)
//! ```
//!
//! # Design Decisions
//! - The backend protocol carries no correlation id; nothing here inspects
//!   a reply to decide who it belongs to
//! - Only the fields an action defines are transmitted

pub mod action;
pub mod reply;
pub mod request;

use thiserror::Error;

pub use action::Action;
pub use reply::Reply;
pub use request::Request;

/// Errors raised while building a request from caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Action name is not one the backend understands.
    #[error("unknown action [{0}]")]
    UnknownAction(String),

    /// Payload is not a JSON object, or a field has an unusable type.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

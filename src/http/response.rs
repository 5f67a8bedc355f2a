//! Response construction.
//!
//! # Responsibilities
//! - Pass backend replies through unchanged
//! - Map each gateway failure to its own status code and error kind
//!
//! # Design Decisions
//! - Reply bytes are never rewritten; content type is sniffed, not assumed
//! - Errors are JSON `{"error": kind, "message": text}` so clients can
//!   branch on `error` without parsing prose
//! - Backend timeouts result in 504 Gateway Timeout

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::channel::ChannelError;
use crate::gateway::GatewayError;
use crate::protocol::Reply;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// HTTP status for a gateway failure.
pub fn status_for(error: &GatewayError) -> StatusCode {
    match error {
        GatewayError::InvalidAction(_) | GatewayError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        GatewayError::Channel(ChannelError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        GatewayError::Channel(_) => StatusCode::BAD_GATEWAY,
        GatewayError::ChannelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status_for(&self), Json(body)).into_response()
    }
}

/// 200 response carrying the backend reply as-is.
pub fn reply_response(reply: Reply) -> Response {
    let content_type = if reply.json().is_some() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };
    ([(header::CONTENT_TYPE, content_type)], reply.into_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn each_failure_has_its_own_status() {
        let cases = [
            (GatewayError::InvalidAction("X".into()), StatusCode::BAD_REQUEST),
            (GatewayError::InvalidPayload("x".into()), StatusCode::BAD_REQUEST),
            (
                GatewayError::Channel(ChannelError::Transport("reset".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                GatewayError::Channel(ChannelError::Decode("utf-8".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                GatewayError::Channel(ChannelError::Timeout(Duration::from_secs(1))),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (GatewayError::ChannelUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(status_for(&error), status, "{:?}", error);
        }
    }

    #[test]
    fn non_json_replies_are_plain_text() {
        let reply = Reply::from_bytes(b"{'result' : 'Error'}".to_vec()).unwrap();
        let response = reply_response(reply);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}

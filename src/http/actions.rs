//! Action endpoints.
//!
//! One route per backend action plus a generic `/actions/{action}` route.
//! Bodies are optional JSON objects or urlencoded forms; an empty body means
//! no payload.

use std::collections::HashMap;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde_json::{json, Map, Value};

use crate::gateway::GatewayError;
use crate::http::response::reply_response;
use crate::http::server::AppState;
use crate::protocol::Action;

/// `POST /worker-info`
pub async fn worker_info(State(state): State<AppState>) -> Result<Response, GatewayError> {
    forward(&state, Action::WorkerInfo, None).await
}

/// `POST /game-info` with optional `{"game_id": ...}`.
///
/// `game_info` is accepted as an alias, which is what the web front end sends.
pub async fn game_info(
    State(state): State<AppState>,
    Payload(fields): Payload,
) -> Result<Response, GatewayError> {
    let game_id = fields.and_then(|mut fields| {
        fields
            .remove("game_id")
            .or_else(|| fields.remove("game_info"))
    });
    let payload = game_id.map(|id| json!({ "game_id": id }));

    forward(&state, Action::GameInfo, payload).await
}

/// `POST /actions/{action}` with an optional JSON object body.
pub async fn submit(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Payload(fields): Payload,
) -> Result<Response, GatewayError> {
    let action: Action = action.parse()?;
    let payload = fields.map(Value::Object);

    forward(&state, action, payload).await
}

/// `GET /health`: 200 while the backend channel accepts calls.
pub async fn health(State(state): State<AppState>) -> Response {
    let channel = state.gateway.serializer().state();
    let (status, label) = if channel.accepts_calls() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (status, Json(json!({ "status": label, "channel": channel }))).into_response()
}

async fn forward(
    state: &AppState,
    action: Action,
    payload: Option<Value>,
) -> Result<Response, GatewayError> {
    let started = Instant::now();

    match state.gateway.submit_action(action, payload).await {
        Ok(reply) => {
            tracing::info!(
                action = %action,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Backend reply delivered"
            );
            Ok(reply_response(reply))
        }
        Err(error) => {
            tracing::warn!(
                action = %action,
                kind = error.kind(),
                error = %error,
                "Backend call failed"
            );
            Err(error)
        }
    }
}

/// Optional request fields, from a JSON object or a urlencoded form.
///
/// Form values are always strings. An empty body of either kind yields `None`.
pub struct Payload(pub Option<Map<String, Value>>);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(form_rejection)?;
            let fields: Map<String, Value> = fields
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect();
            return Ok(Payload((!fields.is_empty()).then_some(fields)));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        parse_payload(&body)
            .map(Payload)
            .map_err(IntoResponse::into_response)
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn form_rejection(rejection: FormRejection) -> Response {
    match rejection {
        // Body read failures (size limit included) keep axum's own status.
        FormRejection::BytesRejection(inner) => inner.into_response(),
        other => GatewayError::InvalidPayload(other.body_text()).into_response(),
    }
}

fn parse_payload(body: &[u8]) -> Result<Option<Map<String, Value>>, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(Some(fields)),
        Ok(Value::Null) => Ok(None),
        Ok(_) => Err(GatewayError::InvalidPayload(
            "request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(GatewayError::InvalidPayload(format!("malformed JSON body: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_bodies_carry_no_payload() {
        assert_eq!(parse_payload(b"").unwrap(), None);
        assert_eq!(parse_payload(b"  \n").unwrap(), None);
        assert_eq!(parse_payload(b"null").unwrap(), None);
    }

    #[test]
    fn form_content_type_is_detected() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=UTF-8".parse().unwrap(),
        );
        assert!(is_form(&headers));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(matches!(parse_payload(b"[1]"), Err(GatewayError::InvalidPayload(_))));
        assert!(matches!(parse_payload(b"{oops"), Err(GatewayError::InvalidPayload(_))));
    }
}

//! Backend request construction and wire encoding.
//!
//! # Wire Format
//! ```text
//! {"action":"GameInfo","game_id":"42"}
//! ```
//! One JSON text frame per request. `action` is always present; the
//! action's own fields follow, flattened, in string form.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::protocol::{Action, ProtocolError};

/// A single request bound for the backend. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    action: Action,
    fields: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    action: &'static str,
    #[serde(flatten)]
    fields: &'a BTreeMap<String, String>,
}

impl Request {
    /// Build a request from a caller-supplied payload.
    ///
    /// The payload must be a JSON object (or absent/null). Fields the action
    /// does not define are dropped; defined fields that are null are treated
    /// as absent. Scalars are coerced to their string form, so a numeric
    /// `game_id` of `42` is sent as `"42"`.
    pub fn new(action: Action, payload: Option<Value>) -> Result<Self, ProtocolError> {
        let mut fields = BTreeMap::new();

        let object = match payload {
            None | Some(Value::Null) => return Ok(Self { action, fields }),
            Some(Value::Object(object)) => object,
            Some(other) => {
                return Err(ProtocolError::InvalidPayload(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        for name in action.fields() {
            match object.get(*name) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    fields.insert(name.to_string(), coerce_field(name, value)?);
                }
            }
        }

        Ok(Self { action, fields })
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Encode into the backend's JSON text frame.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&WireRequest {
            action: self.action.as_str(),
            fields: &self.fields,
        })
    }
}

fn coerce_field(name: &str, value: &Value) -> Result<String, ProtocolError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ProtocolError::InvalidPayload(format!(
            "field `{}` must be a string, number or boolean, got {}",
            name,
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

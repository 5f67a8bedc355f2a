//! Backend replies.

use serde_json::Value;

/// Text returned by the backend for the most recently sent request.
///
/// Carries no identifier; which caller it belongs to is decided purely by
/// its position in the request/reply sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    text: String,
}

impl Reply {
    /// Decode a raw reply. The backend speaks a textual format, so anything
    /// that is not UTF-8 is rejected.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, std::string::FromUtf8Error> {
        String::from_utf8(bytes).map(|text| Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Parse the reply as JSON, if it is JSON.
    ///
    /// The trainer answers some failures with single-quoted pseudo-JSON, so
    /// callers must not assume this succeeds.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }
}

//! Enumerated backend actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolError;

/// An action the trainer backend knows how to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Snapshot of the training and inference workers.
    WorkerInfo,
    /// Recorded games, optionally narrowed to one `game_id`.
    GameInfo,
}

impl Action {
    /// Every action, in wire order.
    pub const ALL: [Action; 2] = [Action::WorkerInfo, Action::GameInfo];

    /// Name used in the `action` field on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::WorkerInfo => "WorkerInfo",
            Action::GameInfo => "GameInfo",
        }
    }

    /// Payload fields this action forwards to the backend.
    ///
    /// Every forwarded field is sent in string form.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Action::WorkerInfo => &[],
            Action::GameInfo => &["game_id"],
        }
    }
}

impl FromStr for Action {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Request gateway.
//!
//! # Responsibilities
//! - Present each external call as one async operation with one outcome
//! - Reject unknown actions and unusable payloads before they are queued
//! - Delegate everything else to the channel serializer
//!
//! # Design Decisions
//! - Holds no backend state; cloning shares the same serializer
//! - Fails fast with `ChannelUnavailable` while the channel is down, rather
//!   than queueing calls that would only be drained
//! - No retries: backend actions are not assumed idempotent

pub mod error;

use serde_json::Value;

use crate::channel::SerializerHandle;
use crate::protocol::{Action, Reply, Request};

pub use error::GatewayError;

/// Public entry point for backend calls.
#[derive(Clone)]
pub struct Gateway {
    serializer: SerializerHandle,
}

impl Gateway {
    pub fn new(serializer: SerializerHandle) -> Self {
        Self { serializer }
    }

    /// Submit an action by wire name.
    pub async fn submit(&self, action: &str, payload: Option<Value>) -> Result<Reply, GatewayError> {
        let action: Action = action.parse()?;
        self.submit_action(action, payload).await
    }

    /// Submit an already-parsed action.
    pub async fn submit_action(
        &self,
        action: Action,
        payload: Option<Value>,
    ) -> Result<Reply, GatewayError> {
        let request = Request::new(action, payload)?;

        if !self.serializer.state().accepts_calls() {
            tracing::debug!(action = %action, "Rejecting call; backend channel unavailable");
            return Err(GatewayError::ChannelUnavailable);
        }

        self.serializer.call(request).await.map_err(GatewayError::from)
    }

    pub fn serializer(&self) -> &SerializerHandle {
        &self.serializer
    }
}

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the wait for a backend reply when a limit is configured
//! - Surface an elapsed limit as a distinct channel error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - No limit by default: an unbounded wait matches the backend contract,
//!   at the cost of one silent backend stalling every queued caller

use std::future::Future;
use std::time::Duration;

use crate::channel::ChannelError;

/// Await `reply`, failing with [`ChannelError::Timeout`] once `limit` elapses.
pub async fn with_reply_timeout<F, T>(limit: Option<Duration>, reply: F) -> Result<T, ChannelError>
where
    F: Future<Output = Result<T, ChannelError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, reply)
            .await
            .map_err(|_| ChannelError::Timeout(limit))?,
        None => reply.await,
    }
}

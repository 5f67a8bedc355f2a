//! Channel state and serializer bookkeeping.
//!
//! # States
//! - Connected: calls are sent to the backend
//! - Unavailable: a channel failure drained the queue; calls fail until reconnect
//! - Closed: the serializer has shut down
//!
//! # State Transitions
//! ```text
//! Connected → Unavailable: transport, encode, decode or timeout failure
//! Unavailable → Connected: successful reconnect (explicit or automatic)
//! any → Closed: shutdown
//! ```
//!
//! # Design Decisions
//! - Written only by the serializer task, read by anyone holding a handle
//! - Lock-free counters so status reads never contend with the worker

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

use serde::Serialize;

use crate::protocol::Action;

/// Channel state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    Connected = 0,
    Unavailable = 1,
    Closed = 2,
}

impl ChannelState {
    /// Whether new calls should be admitted.
    pub fn accepts_calls(&self) -> bool {
        *self == ChannelState::Connected
    }
}

impl From<u8> for ChannelState {
    fn from(val: u8) -> Self {
        match val {
            0 => ChannelState::Connected,
            1 => ChannelState::Unavailable,
            _ => ChannelState::Closed,
        }
    }
}

/// Per-call lifecycle.
///
/// ```text
/// Queued → Sending → AwaitingReply → Completed
///                  ↘               ↘ Failed
/// Queued → Failed (never sent: channel unavailable)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Queued,
    Sending,
    AwaitingReply,
    Completed,
    Failed,
}

impl CallState {
    pub fn can_advance_to(self, next: CallState) -> bool {
        use CallState::*;
        matches!(
            (self, next),
            (Queued, Sending)
                | (Queued, Failed)
                | (Sending, AwaitingReply)
                | (Sending, Failed)
                | (AwaitingReply, Completed)
                | (AwaitingReply, Failed)
        )
    }
}

/// Shared counters for one serializer.
#[derive(Debug)]
pub struct SerializerStats {
    state: AtomicU8,
    queued: AtomicUsize,
    completed: AtomicU64,
    failed: AtomicU64,
    /// 0 = idle, otherwise 1 + index into `Action::ALL`.
    in_flight: AtomicU8,
}

/// Point-in-time copy of [`SerializerStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub state: ChannelState,
    pub queued: usize,
    pub completed: u64,
    pub failed: u64,
    pub in_flight: Option<Action>,
}

impl SerializerStats {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ChannelState::Connected as u8),
            queued: AtomicUsize::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            in_flight: AtomicU8::new(0),
        }
    }

    pub fn state(&self) -> ChannelState {
        ChannelState::from(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ChannelState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    /// Returns the new depth.
    pub(crate) fn admitted(&self) -> usize {
        self.queued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the new depth.
    pub(crate) fn dequeued(&self) -> usize {
        self.queued.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    pub(crate) fn record_outcome(&self, success: bool) {
        if success {
            self.completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn set_in_flight(&self, action: Option<Action>) {
        let slot = action
            .and_then(|a| Action::ALL.iter().position(|candidate| *candidate == a))
            .map_or(0, |index| index as u8 + 1);
        self.in_flight.store(slot, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let in_flight = match self.in_flight.load(Ordering::Relaxed) {
            0 => None,
            slot => Action::ALL.get(slot as usize - 1).copied(),
        };
        StatsSnapshot {
            state: self.state(),
            queued: self.queued(),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight,
        }
    }
}

impl Default for SerializerStats {
    fn default() -> Self {
        Self::new()
    }
}

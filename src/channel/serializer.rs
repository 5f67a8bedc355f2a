//! Channel serializer.
//!
//! # Responsibilities
//! - Own the backend channel and the FIFO queue of pending calls
//! - Run one send/receive cycle at a time, completing the head call
//! - Drain the queue and stop sending after a channel failure
//! - Reconnect on request (and optionally on its own with backoff)
//!
//! # Design Decisions
//! - Single task owns all mutable state; callers only hold a handle
//! - `mpsc` gives admission order; nothing ever reorders it
//! - Abandoned calls stay queued and are still sent. The backend cannot
//!   cancel a request and skipping one would shift every later reply, so the
//!   outcome is produced and then discarded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant as Deadline};

use crate::channel::state::{CallState, ChannelState, SerializerStats, StatsSnapshot};
use crate::channel::{CallError, Channel, ChannelError};
use crate::config::{GatewayConfig, ReconnectConfig};
use crate::observability::metrics;
use crate::protocol::{Reply, Request};
use crate::resilience::backoff::reconnect_delay;
use crate::resilience::timeouts::with_reply_timeout;

/// An admitted call awaiting exactly one outcome.
struct PendingCall {
    request: Request,
    state: CallState,
    completion: oneshot::Sender<Result<Reply, CallError>>,
    admitted_at: Instant,
}

impl PendingCall {
    fn advance(&mut self, next: CallState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid call transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(
            action = %self.request.action(),
            from = ?self.state,
            to = ?next,
            "Call state"
        );
        self.state = next;
    }
}

enum Command {
    Call(PendingCall),
    Reconnect(oneshot::Sender<Result<(), CallError>>),
}

/// Serializer tuning.
#[derive(Debug, Clone)]
pub struct SerializerOptions {
    pub queue_capacity: usize,
    pub reply_timeout: Option<Duration>,
    pub reconnect: ReconnectConfig,
}

impl SerializerOptions {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            queue_capacity: config.serializer.queue_capacity,
            reply_timeout: config.timeouts.reply_timeout(),
            reconnect: config.reconnect.clone(),
        }
    }
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

/// Cloneable handle for submitting calls to the serializer.
#[derive(Clone)]
pub struct SerializerHandle {
    commands: mpsc::Sender<Command>,
    stats: Arc<SerializerStats>,
    endpoint: Arc<str>,
}

impl SerializerHandle {
    /// Admit `request` and wait for its reply.
    ///
    /// Dropping the returned future after admission does not withdraw the
    /// call; it is still sent and its outcome discarded.
    pub async fn call(&self, request: Request) -> Result<Reply, CallError> {
        let action = request.action();
        let (completion, outcome) = oneshot::channel();

        // Reserve first so a caller dropped while waiting for space leaves no trace.
        let permit = self
            .commands
            .reserve()
            .await
            .map_err(|_| CallError::Unavailable)?;
        let depth = self.stats.admitted();
        permit.send(Command::Call(PendingCall {
            request,
            state: CallState::Queued,
            completion,
            admitted_at: Instant::now(),
        }));
        metrics::set_queue_depth(depth);
        tracing::debug!(action = %action, queued = depth, "Call admitted");

        // The slot only closes unfilled if the worker task died.
        outcome.await.unwrap_or(Err(CallError::Unavailable))
    }

    /// Replace the backend connection and resume sending.
    ///
    /// Ordered with calls: everything admitted earlier is resolved first.
    pub async fn reconnect(&self) -> Result<(), CallError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Reconnect(reply))
            .await
            .map_err(|_| CallError::Unavailable)?;
        outcome.await.unwrap_or(Err(CallError::Unavailable))
    }

    pub fn state(&self) -> ChannelState {
        self.stats.state()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// The single owner of the backend channel.
pub struct Serializer<C> {
    channel: C,
    commands: mpsc::Receiver<Command>,
    stats: Arc<SerializerStats>,
    options: SerializerOptions,
    shutdown: broadcast::Receiver<()>,
    watch_shutdown: bool,
    reconnect_at: Option<Deadline>,
    reconnect_attempts: u32,
}

impl<C: Channel> Serializer<C> {
    /// Start the worker task for a connected channel.
    pub fn spawn(
        channel: C,
        options: SerializerOptions,
        shutdown: broadcast::Receiver<()>,
    ) -> (SerializerHandle, JoinHandle<()>) {
        let (commands_tx, commands) = mpsc::channel(options.queue_capacity.max(1));
        let stats = Arc::new(SerializerStats::new());

        let handle = SerializerHandle {
            commands: commands_tx,
            stats: Arc::clone(&stats),
            endpoint: Arc::from(channel.endpoint()),
        };

        let worker = Self {
            channel,
            commands,
            stats,
            options,
            shutdown,
            watch_shutdown: true,
            reconnect_at: None,
            reconnect_attempts: 0,
        };

        (handle, tokio::spawn(worker.run()))
    }

    async fn run(mut self) {
        tracing::info!(
            endpoint = %self.channel.endpoint(),
            queue_capacity = self.options.queue_capacity,
            reply_timeout_ms = self.options.reply_timeout.map(|t| t.as_millis() as u64),
            "Channel serializer started"
        );

        loop {
            let reconnect_deadline = self.reconnect_at.unwrap_or_else(Deadline::now);

            tokio::select! {
                biased;
                signal = self.shutdown.recv(), if self.watch_shutdown => match signal {
                    // Coordinator gone without a signal; keep serving until handles drop.
                    Err(broadcast::error::RecvError::Closed) => self.watch_shutdown = false,
                    _ => {
                        tracing::info!("Channel serializer received shutdown signal");
                        break;
                    }
                },
                _ = sleep_until(reconnect_deadline), if self.reconnect_at.is_some() => {
                    self.auto_reconnect().await;
                }
                command = self.commands.recv() => match command {
                    Some(Command::Call(call)) => self.dispatch(call).await,
                    Some(Command::Reconnect(reply)) => {
                        let result = self.reconnect().await;
                        let _ = reply.send(result);
                    }
                    None => break,
                },
            }
        }

        self.close();
        tracing::info!("Channel serializer stopped");
    }

    async fn dispatch(&mut self, mut call: PendingCall) {
        metrics::set_queue_depth(self.stats.dequeued());

        if !self.stats.state().accepts_calls() {
            call.advance(CallState::Failed);
            self.complete(call, Err(CallError::Unavailable));
            return;
        }

        let action = call.request.action();
        self.stats.set_in_flight(Some(action));
        let outcome = self.round_trip(&mut call).await;
        self.stats.set_in_flight(None);

        match outcome {
            Ok(reply) => {
                call.advance(CallState::Completed);
                self.complete(call, Ok(reply));
            }
            Err(error) => {
                tracing::warn!(action = %action, error = %error, "Backend round trip failed");
                call.advance(CallState::Failed);
                self.complete(call, Err(CallError::Channel(error)));
                self.fail_channel().await;
            }
        }
    }

    /// One send/receive cycle. Never reads before the send has succeeded.
    async fn round_trip(&mut self, call: &mut PendingCall) -> Result<Reply, ChannelError> {
        call.advance(CallState::Sending);
        let frame = call
            .request
            .encode()
            .map_err(|e| ChannelError::Encode(e.to_string()))?;
        self.channel.send(frame).await?;

        call.advance(CallState::AwaitingReply);
        let bytes = with_reply_timeout(self.options.reply_timeout, self.channel.recv()).await?;
        Reply::from_bytes(bytes).map_err(|e| ChannelError::Decode(e.to_string()))
    }

    fn complete(&self, call: PendingCall, outcome: Result<Reply, CallError>) {
        let action = call.request.action();
        let label = outcome_label(&outcome);

        self.stats.record_outcome(outcome.is_ok());
        metrics::record_call(action, label, call.admitted_at);
        tracing::debug!(
            action = %action,
            outcome = label,
            elapsed_ms = call.admitted_at.elapsed().as_millis() as u64,
            "Call completed"
        );

        if call.completion.send(outcome).is_err() {
            tracing::debug!(action = %action, "Caller abandoned the call; outcome discarded");
        }
    }

    /// Mark the channel unavailable and fail everything already queued.
    async fn fail_channel(&mut self) {
        self.stats.set_state(ChannelState::Unavailable);
        metrics::record_channel_failure();

        let mut drained = 0usize;
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Call(mut call) => {
                    metrics::set_queue_depth(self.stats.dequeued());
                    call.advance(CallState::Failed);
                    self.complete(call, Err(CallError::Unavailable));
                    drained += 1;
                }
                Command::Reconnect(reply) => {
                    // Calls admitted after this reconnect are served normally.
                    let result = self.reconnect().await;
                    let _ = reply.send(result);
                    break;
                }
            }
        }

        tracing::warn!(drained, "Backend channel unavailable; queued calls failed");

        if !self.stats.state().accepts_calls() {
            self.schedule_reconnect();
        }
    }

    async fn reconnect(&mut self) -> Result<(), CallError> {
        match self.channel.reconnect().await {
            Ok(()) => {
                self.stats.set_state(ChannelState::Connected);
                self.reconnect_at = None;
                self.reconnect_attempts = 0;
                metrics::record_reconnect(true);
                tracing::info!(endpoint = %self.channel.endpoint(), "Backend channel available");
                Ok(())
            }
            Err(error) => {
                self.stats.set_state(ChannelState::Unavailable);
                metrics::record_reconnect(false);
                tracing::warn!(
                    endpoint = %self.channel.endpoint(),
                    error = %error,
                    "Backend reconnect failed"
                );
                Err(CallError::Channel(error))
            }
        }
    }

    async fn auto_reconnect(&mut self) {
        self.reconnect_at = None;
        self.reconnect_attempts += 1;
        if self.reconnect().await.is_err() {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(&mut self) {
        let config = &self.options.reconnect;
        if !config.enabled {
            return;
        }

        if self.reconnect_attempts >= config.max_attempts {
            tracing::error!(
                attempts = self.reconnect_attempts,
                "Giving up on automatic reconnect; explicit reconnect required"
            );
            return;
        }

        let delay = reconnect_delay(self.reconnect_attempts + 1, config);
        self.reconnect_at = Some(Deadline::now() + delay);
        tracing::info!(
            attempt = self.reconnect_attempts + 1,
            delay_ms = delay.as_millis() as u64,
            "Scheduling backend reconnect"
        );
    }

    fn close(&mut self) {
        self.stats.set_state(ChannelState::Closed);
        self.reconnect_at = None;
        self.commands.close();

        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Call(mut call) => {
                    metrics::set_queue_depth(self.stats.dequeued());
                    call.advance(CallState::Failed);
                    self.complete(call, Err(CallError::Unavailable));
                }
                Command::Reconnect(reply) => {
                    let _ = reply.send(Err(CallError::Unavailable));
                }
            }
        }
    }
}

fn outcome_label(outcome: &Result<Reply, CallError>) -> &'static str {
    match outcome {
        Ok(_) => "ok",
        Err(CallError::Unavailable) => "unavailable",
        Err(CallError::Channel(ChannelError::Timeout(_))) => "timeout",
        Err(CallError::Channel(ChannelError::Decode(_))) => "decode_error",
        Err(CallError::Channel(_)) => "channel_error",
    }
}

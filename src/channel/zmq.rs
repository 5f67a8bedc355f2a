//! ZeroMQ REQ transport to the trainer backend.
//!
//! # Responsibilities
//! - Connect a REQ socket to the trainer's REP endpoint
//! - Send one frame, receive one multi-part reply, strictly alternating
//! - Replace the socket on reconnect
//!
//! # Design Decisions
//! - Tracks its own alternation state; an out-of-order send or receive is
//!   refused rather than handed to the socket
//! - A failed receive leaves the reply owed, so only a reconnect clears it

use std::time::Duration;

use async_trait::async_trait;
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::channel::{Channel, ChannelError};
use crate::config::BackendConfig;

/// REQ socket connected to the backend.
pub struct ZmqChannel {
    endpoint: String,
    connect_timeout: Duration,
    socket: Option<ReqSocket>,
    awaiting_reply: bool,
}

impl ZmqChannel {
    /// Connect to the configured backend.
    pub async fn connect(
        config: &BackendConfig,
        connect_timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let endpoint = config.endpoint();
        let socket = open(&endpoint, connect_timeout).await?;

        tracing::info!(endpoint = %endpoint, "Backend channel connected");

        Ok(Self {
            endpoint,
            connect_timeout,
            socket: Some(socket),
            awaiting_reply: false,
        })
    }

    fn socket(&mut self) -> Result<&mut ReqSocket, ChannelError> {
        self.socket
            .as_mut()
            .ok_or_else(|| ChannelError::Transport("socket closed".to_string()))
    }
}

async fn open(endpoint: &str, connect_timeout: Duration) -> Result<ReqSocket, ChannelError> {
    let mut socket = ReqSocket::new();
    match tokio::time::timeout(connect_timeout, socket.connect(endpoint)).await {
        Ok(Ok(())) => Ok(socket),
        Ok(Err(e)) => Err(ChannelError::Connect(format!("{}: {}", endpoint, e))),
        Err(_) => Err(ChannelError::Connect(format!(
            "{}: timed out after {}s",
            endpoint,
            connect_timeout.as_secs()
        ))),
    }
}

#[async_trait]
impl Channel for ZmqChannel {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ChannelError> {
        if self.awaiting_reply {
            return Err(ChannelError::OutOfSequence("send while a reply is still owed"));
        }

        self.socket()?
            .send(ZmqMessage::from(frame))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        self.awaiting_reply = true;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>, ChannelError> {
        if !self.awaiting_reply {
            return Err(ChannelError::OutOfSequence("receive without a matching send"));
        }

        let message = self
            .socket()?
            .recv()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        self.awaiting_reply = false;

        let mut body = Vec::new();
        for frame in message.into_vec() {
            body.extend_from_slice(&frame);
        }
        Ok(body)
    }

    async fn reconnect(&mut self) -> Result<(), ChannelError> {
        // Drop the old socket first so its pending state never leaks into the new one.
        self.socket = None;
        self.awaiting_reply = false;

        let socket = open(&self.endpoint, self.connect_timeout).await?;
        self.socket = Some(socket);

        tracing::info!(endpoint = %self.endpoint, "Backend channel reconnected");
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

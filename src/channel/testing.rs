//! Instrumented channel double for serializer, gateway and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::channel::{Channel, ChannelError, Serializer, SerializerHandle, SerializerOptions};
use crate::lifecycle::Shutdown;

/// What the double observed.
#[derive(Default)]
pub(crate) struct Probe {
    sent: Mutex<Vec<String>>,
    violations: AtomicUsize,
    reconnects: AtomicUsize,
}

impl Probe {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Out-of-alternation sends or receives.
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }

    pub fn reconnects(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }
}

/// Replies `{"seq": n, "request": <n-th request>}` to the n-th request.
pub(crate) struct ScriptedChannel {
    probe: Arc<Probe>,
    awaiting: bool,
    latency: Duration,
    gate: Option<Arc<Semaphore>>,
    fail_reply: Option<usize>,
    corrupt_reply: Option<usize>,
    fail_reconnects: bool,
}

impl ScriptedChannel {
    pub fn new() -> (Self, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let channel = Self {
            probe: Arc::clone(&probe),
            awaiting: false,
            latency: Duration::ZERO,
            gate: None,
            fail_reply: None,
            corrupt_reply: None,
            fail_reconnects: false,
        };
        (channel, probe)
    }

    /// Each reply takes `latency` to arrive.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Each reply waits for one permit on the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// The reply to the `n`-th request (1-based) fails with a transport error.
    pub fn fail_reply(mut self, n: usize) -> Self {
        self.fail_reply = Some(n);
        self
    }

    /// The reply to the `n`-th request (1-based) is not valid UTF-8.
    pub fn corrupt_reply(mut self, n: usize) -> Self {
        self.corrupt_reply = Some(n);
        self
    }

    pub fn fail_reconnects(mut self) -> Self {
        self.fail_reconnects = true;
        self
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ChannelError> {
        if self.awaiting {
            self.probe.violations.fetch_add(1, Ordering::SeqCst);
            return Err(ChannelError::OutOfSequence("send while a reply is still owed"));
        }
        let text = String::from_utf8(frame).expect("requests are UTF-8 JSON");
        self.probe.sent.lock().unwrap().push(text);
        self.awaiting = true;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>, ChannelError> {
        if !self.awaiting {
            self.probe.violations.fetch_add(1, Ordering::SeqCst);
            return Err(ChannelError::OutOfSequence("receive without a matching send"));
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.awaiting = false;

        let (seq, request) = {
            let sent = self.probe.sent.lock().unwrap();
            (sent.len(), sent.last().cloned().unwrap_or_default())
        };
        if self.fail_reply == Some(seq) {
            return Err(ChannelError::Transport("connection reset by peer".into()));
        }
        if self.corrupt_reply == Some(seq) {
            return Ok(vec![0xff, 0xfe, b'{', 0x80]);
        }
        Ok(format!(r#"{{"seq":{},"request":{}}}"#, seq, request).into_bytes())
    }

    async fn reconnect(&mut self) -> Result<(), ChannelError> {
        self.awaiting = false;
        if self.fail_reconnects {
            return Err(ChannelError::Connect("connection refused".into()));
        }
        self.probe.reconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "scripted://backend"
    }
}

/// Spawn a serializer over `channel`. Keep the `Shutdown` alive for the test.
pub(crate) fn spawn_serializer(
    channel: ScriptedChannel,
    options: SerializerOptions,
) -> (SerializerHandle, Shutdown, JoinHandle<()>) {
    let shutdown = Shutdown::new();
    let (handle, task) = Serializer::spawn(channel, options, shutdown.subscribe());
    (handle, shutdown, task)
}

/// Poll `condition` until it holds, failing the test after ~1s.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached in time");
}

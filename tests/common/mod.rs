//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use zeromq::{RepSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use trainer_gateway::channel::{Serializer, SerializerOptions, ZmqChannel};
use trainer_gateway::config::{BackendConfig, GatewayConfig};
use trainer_gateway::{Gateway, HttpServer, SerializerHandle, Shutdown};

/// Start a mock trainer on `port` that answers each request with
/// `{"seq": n, "echo": <request>}` after `delay`.
///
/// Returns a counter of requests received.
pub async fn start_mock_trainer(port: u16, delay: Duration) -> Arc<AtomicUsize> {
    let mut socket = RepSocket::new();
    socket
        .bind(&format!("tcp://127.0.0.1:{}", port))
        .await
        .unwrap();

    let received = Arc::new(AtomicUsize::new(0));
    let counter = received.clone();

    tokio::spawn(async move {
        loop {
            let message = match socket.recv().await {
                Ok(message) => message,
                Err(_) => break,
            };
            let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;

            let mut request = Vec::new();
            for frame in message.into_vec() {
                request.extend_from_slice(&frame);
            }
            let request = String::from_utf8_lossy(&request).into_owned();

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let reply = format!(r#"{{"seq":{},"echo":{}}}"#, seq, request);
            if socket.send(ZmqMessage::from(reply)).await.is_err() {
                break;
            }
        }
    });

    received
}

pub fn backend_config(port: u16) -> BackendConfig {
    BackendConfig {
        address: format!("127.0.0.1:{}", port),
    }
}

/// Connect a serializer to the mock trainer on `port`.
pub async fn connect_serializer(
    port: u16,
    shutdown: &Shutdown,
) -> (SerializerHandle, JoinHandle<()>) {
    let channel = ZmqChannel::connect(&backend_config(port), Duration::from_secs(2))
        .await
        .expect("mock trainer reachable");
    Serializer::spawn(channel, SerializerOptions::default(), shutdown.subscribe())
}

/// Serve the gateway on an ephemeral port backed by the mock trainer on `port`.
#[allow(dead_code)]
pub async fn start_gateway(port: u16, shutdown: &Shutdown) -> SocketAddr {
    let (serializer, _worker) = connect_serializer(port, shutdown).await;

    let mut config = GatewayConfig::default();
    config.backend = backend_config(port);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, Gateway::new(serializer));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    addr
}

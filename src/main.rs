//! Trainer Gateway
//!
//! HTTP front end for the trainer's request-reply socket.
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP clients (many, concurrent)
//!        │
//!        ▼
//!   ┌──────────┐    ┌──────────┐    ┌─────────────────────┐    ┌─────────┐
//!   │   http   │───▶│ gateway  │───▶│ channel serializer  │───▶│ ZMQ REQ │───▶ trainer (REP)
//!   │  router  │◀───│  submit  │◀───│ FIFO, one in flight │◀───│ socket  │◀───
//!   └──────────┘    └──────────┘    └─────────────────────┘    └─────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use trainer_gateway::channel::{Serializer, SerializerOptions, ZmqChannel};
use trainer_gateway::config::{load_or_default, validate_config, ConfigError};
use trainer_gateway::lifecycle::{signals, Shutdown};
use trainer_gateway::observability::{logging, metrics};
use trainer_gateway::{Gateway, HttpServer};

#[derive(Parser)]
#[command(name = "trainer-gateway", version)]
#[command(about = "HTTP gateway for the trainer's request-reply socket", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides listener.bind_address)
    #[arg(short, long)]
    listen: Option<String>,

    /// Trainer socket address, host:port (overrides backend.address)
    #[arg(short, long)]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listener.bind_address = listen;
    }
    if let Some(backend) = args.backend {
        config.backend.address = backend;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability)?;

    tracing::info!("trainer-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.endpoint(),
        queue_capacity = config.serializer.queue_capacity,
        reply_timeout_ms = config.timeouts.reply_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    // Backend first: refuse traffic we could not forward.
    let channel = ZmqChannel::connect(&config.backend, config.timeouts.connect()).await?;
    let (serializer, worker) = Serializer::spawn(
        channel,
        SerializerOptions::from_config(&config),
        shutdown.subscribe(),
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, Gateway::new(serializer));
    let served = server.run(listener, shutdown.subscribe()).await;

    // Serializer answers whatever is still queued before the process exits.
    shutdown.trigger();
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Channel serializer task failed");
    }

    served?;
    tracing::info!("Shutdown complete");
    Ok(())
}

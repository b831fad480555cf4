use anyhow::{Context, Result};
use clap::Parser;
use rendezvous_server::{RelayConfig, SignalingService, serve};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// WebRTC signaling relay: forwards offers, answers and ICE candidates between peers.
#[derive(Parser, Debug)]
#[command(name = "rendezvous", version)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "RENDEZVOUS_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Path of the WebSocket endpoint.
    #[arg(long, env = "RENDEZVOUS_WS_PATH", default_value = "/ws", value_parser = parse_path)]
    ws_path: String,

    /// Seconds a cached offer stays eligible for replay.
    #[arg(long, env = "RENDEZVOUS_OFFER_TTL", default_value_t = 300)]
    offer_ttl_secs: u64,

    /// Milliseconds to wait on a full peer queue before giving up on that peer.
    #[arg(long, env = "RENDEZVOUS_SEND_TIMEOUT_MS", default_value_t = 5000)]
    send_timeout_ms: u64,

    /// Outbound queue depth per connection.
    #[arg(long, env = "RENDEZVOUS_OUTBOUND_CAPACITY", default_value_t = 64)]
    outbound_capacity: usize,

    /// Largest accepted message in bytes.
    #[arg(long, env = "RENDEZVOUS_MAX_MESSAGE_BYTES", default_value_t = 256 * 1024)]
    max_message_bytes: usize,

    /// Seconds open connections may drain after a shutdown signal.
    #[arg(long, env = "RENDEZVOUS_SHUTDOWN_GRACE", default_value_t = 10)]
    shutdown_grace_secs: u64,

    /// Seconds between expired-offer sweeps, 0 disables the sweeper.
    #[arg(long, env = "RENDEZVOUS_SWEEP_INTERVAL", default_value_t = 60)]
    sweep_interval_secs: u64,
}

impl Cli {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            ws_path: self.ws_path.clone(),
            offer_ttl: Duration::from_secs(self.offer_ttl_secs),
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            outbound_capacity: self.outbound_capacity.max(1),
            max_message_bytes: self.max_message_bytes,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
            sweep_interval: (self.sweep_interval_secs > 0)
                .then(|| Duration::from_secs(self.sweep_interval_secs)),
        }
    }
}

fn parse_path(value: &str) -> Result<String, String> {
    if value.starts_with('/') {
        Ok(value.to_string())
    } else {
        Err(format!("path must start with '/': {}", value))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.relay_config();

    info!("Starting signaling relay...");
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;

    serve(listener, SignalingService::new(config), shutdown_signal()).await
}

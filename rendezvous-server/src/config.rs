use std::time::Duration;

/// Tunables of the relay. Bind address and log sink are chosen by the binary.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Path of the WebSocket upgrade endpoint.
    pub ws_path: String,
    /// How long a cached offer stays eligible for replay and answer gating.
    pub offer_ttl: Duration,
    /// Upper bound on queueing one payload for one target during fan-out.
    pub send_timeout: Duration,
    /// Per-connection outbound queue depth.
    pub outbound_capacity: usize,
    /// Largest accepted (reassembled) text message.
    pub max_message_bytes: usize,
    /// How long open connections may drain after shutdown starts.
    pub shutdown_grace: Duration,
    /// Period of the expired-offer sweep; `None` relies on lazy expiry alone.
    pub sweep_interval: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ws_path: "/ws".to_string(),
            offer_ttl: Duration::from_secs(5 * 60),
            send_timeout: Duration::from_secs(5),
            outbound_capacity: 64,
            max_message_bytes: 256 * 1024,
            shutdown_grace: Duration::from_secs(10),
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

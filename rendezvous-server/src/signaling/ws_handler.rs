use crate::signaling::{SignalingService, handle_connection};
use axum::Json;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

/// Upgrade endpoint. Plain HTTP requests are turned away by the `WebSocketUpgrade`
/// extractor with a client-error status before this body runs.
pub async fn ws_handler(ws: WebSocketUpgrade, State(service): State<SignalingService>) -> Response {
    if service.is_shutting_down() {
        debug!("refusing upgrade during shutdown");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let limit = service.config().max_message_bytes;
    ws.max_message_size(limit)
        .on_upgrade(move |socket| handle_connection(socket, service))
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub connections: usize,
    pub live_offers: usize,
}

pub async fn health_handler(State(service): State<SignalingService>) -> Json<HealthReport> {
    Json(HealthReport {
        status: if service.is_shutting_down() {
            "draining"
        } else {
            "ok"
        },
        connections: service.connection_count(),
        live_offers: service.live_offer_count(),
    })
}

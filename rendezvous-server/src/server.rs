use crate::signaling::{SignalingService, health_handler, ws_handler};
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(&service.config().ws_path, get(ws_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Runs the relay on `listener` until `shutdown` resolves.
///
/// Shutdown stops accepting, tells every connection to close, and waits for them up to
/// the configured grace period. Whatever is still open afterwards is dropped with the
/// runtime.
pub async fn serve<F>(
    listener: TcpListener,
    service: SignalingService,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("listener has no local address")?;
    info!(
        %addr,
        path = %service.config().ws_path,
        offer_ttl = ?service.config().offer_ttl,
        "signaling relay listening"
    );

    let sweeper = service
        .config()
        .sweep_interval
        .map(|every| spawn_offer_sweeper(service.clone(), every));

    let on_shutdown = service.clone();
    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!(
                connections = on_shutdown.connection_count(),
                "shutdown requested, no longer accepting connections"
            );
            on_shutdown.begin_shutdown();
        })
        .await
        .context("signaling server failed")?;

    let grace = service.config().shutdown_grace;
    if service.wait_drained(grace).await {
        info!("all connections closed");
    } else {
        warn!(
            remaining = service.connection_count(),
            ?grace,
            "grace period elapsed, force-closing remaining connections"
        );
    }

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    Ok(())
}

/// Periodically drops expired offers. Replay and answer gating already ignore them;
/// this only reclaims memory.
pub fn spawn_offer_sweeper(service: SignalingService, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let evicted = service.offers().evict_expired(Instant::now());
                    if evicted > 0 {
                        debug!(evicted, "expired offers evicted");
                    }
                }
                _ = service.stopped() => break,
            }
        }
    })
}

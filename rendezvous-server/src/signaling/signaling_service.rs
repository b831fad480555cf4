use crate::cache::OfferCache;
use crate::config::RelayConfig;
use crate::registry::ConnectionRegistry;
use crate::relay::RelayEngine;
use rendezvous_core::{ConnectionId, ConnectionState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time::Instant;
use tracing::info;

struct SignalingInner {
    config: RelayConfig,
    registry: Arc<ConnectionRegistry>,
    offers: Arc<OfferCache>,
    relay: RelayEngine,
    shutdown: watch::Sender<bool>,
    released: Notify,
}

/// Process-wide relay state: the registry, the offer cache and the shutdown flag.
///
/// Cloned into every connection handler; there is no global instance.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(config.send_timeout));
        let offers = Arc::new(OfferCache::new(config.offer_ttl));
        let relay = RelayEngine::new(registry.clone(), offers.clone(), config.send_timeout);
        let (shutdown, _) = watch::channel(false);

        Self {
            inner: Arc::new(SignalingInner {
                config,
                registry,
                offers,
                relay,
                shutdown,
                released: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn offers(&self) -> &OfferCache {
        &self.inner.offers
    }

    pub fn relay(&self) -> &RelayEngine {
        &self.inner.relay
    }

    pub fn connection_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn live_offer_count(&self) -> usize {
        self.inner.offers.live_count(Instant::now())
    }

    /// Removes a connection from the registry and the offer cache.
    ///
    /// Safe to call from every exit path: only the first call for an id returns `true`
    /// and logs the disconnect.
    pub fn release(&self, id: &ConnectionId) -> bool {
        let handle = self.inner.registry.unregister(id);
        self.inner.offers.remove(id);

        let Some(handle) = handle else {
            return false;
        };
        handle.state().advance(ConnectionState::Closed);
        info!(
            connection = %id,
            connections = self.inner.registry.len(),
            "disconnected"
        );
        self.inner.released.notify_waiters();
        true
    }

    /// Resolves once shutdown has begun.
    pub async fn stopped(&self) {
        let mut rx = self.inner.shutdown.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn begin_shutdown(&self) {
        self.inner.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Waits until every connection has been released, at most `grace`.
    /// Returns `false` if connections were still open when the grace period ran out.
    pub async fn wait_drained(&self, grace: Duration) -> bool {
        let drained = async {
            loop {
                let released = self.inner.released.notified();
                if self.inner.registry.is_empty() {
                    return;
                }
                released.await;
            }
        };
        tokio::time::timeout(grace, drained).await.is_ok()
    }
}

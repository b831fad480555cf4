use crate::cache::OfferCache;
use crate::registry::{ConnectionRegistry, FanOut, PeerHandle};
use crate::relay::{DropReason, RelayOutcome};
use rendezvous_core::{ConnectionId, Signal, SignalKind, SignalMessage, decode};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Decides who receives each inbound signaling message.
///
/// Pairing is coarse: an answer carries no session identifier, so it goes to every other
/// peer that currently holds a live offer. With two participants that is exactly the
/// offerer; with three or more concurrent offerers each of them receives the answer.
#[derive(Clone)]
pub struct RelayEngine {
    registry: Arc<ConnectionRegistry>,
    offers: Arc<OfferCache>,
    send_timeout: Duration,
}

impl RelayEngine {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        offers: Arc<OfferCache>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            offers,
            send_timeout,
        }
    }

    /// Decodes one complete text message from `from` and relays it.
    pub async fn dispatch(&self, from: ConnectionId, text: &str) -> RelayOutcome {
        match decode(text) {
            Ok(message) => self.relay(from, message).await,
            Err(e) => Self::drop_message(from, DropReason::Decode(e)),
        }
    }

    pub async fn relay(&self, from: ConnectionId, message: SignalMessage) -> RelayOutcome {
        let kind = message.kind();
        let fan_out = match message.signal {
            Signal::Offer(_) => {
                self.offers.put(from, message.raw.clone(), Instant::now());
                // A reader that outlives its connection's release must not leave an offer
                // behind. Release unregisters before clearing the cache, so checking after
                // the put covers every interleaving.
                if !self.registry.contains(&from) {
                    self.offers.remove(&from);
                    return Self::drop_message(from, DropReason::SenderReleased);
                }
                self.registry.broadcast_except(&from, message.raw).await
            }
            Signal::Answer(_) => {
                let now = Instant::now();
                let offers = &self.offers;
                self.registry
                    .for_each_except(&from, |target| offers.contains(target, now), message.raw)
                    .await
            }
            Signal::IceCandidate(_) => self.registry.broadcast_except(&from, message.raw).await,
            Signal::Unknown(label) => {
                return Self::drop_message(from, DropReason::UnknownKind(label));
            }
        };

        debug!(
            from = %from,
            kind = %kind,
            delivered = fan_out.delivered,
            failed = fan_out.failed,
            "message-relayed"
        );
        RelayOutcome::Relayed { kind, fan_out }
    }

    /// Sends every live cached offer to a newly joined connection, skipping its own.
    ///
    /// The joiner is already open, so an owner may replace its offer mid-replay and
    /// broadcast the new one. Each offer is therefore read under its cache entry only after
    /// queue space is reserved. The joiner may see the newest offer twice but never a
    /// superseded one after it.
    pub async fn replay_offers(&self, to: &PeerHandle) -> FanOut {
        let owners: Vec<_> = self
            .offers
            .live_entries(Instant::now())
            .map(|(owner, _)| owner)
            .filter(|owner| *owner != to.id())
            .collect();

        let mut report = FanOut::default();
        for owner in owners {
            let permit = match to.reserve(self.send_timeout).await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!(from = %owner, to = %to.id(), reason = %e, "send-failed");
                    report.failed += 1;
                    continue;
                }
            };

            let sent = self.offers.with_live(&owner, Instant::now(), move |payload| {
                permit.send(payload.clone());
            });
            if sent.is_some() {
                report.delivered += 1;
            }
        }

        if report.delivered > 0 {
            debug!(
                to = %to.id(),
                kind = %SignalKind::Offer,
                delivered = report.delivered,
                "replayed cached offers"
            );
        }
        report
    }

    pub(crate) fn drop_message(from: ConnectionId, reason: DropReason) -> RelayOutcome {
        warn!(from = %from, reason = %reason, "message-dropped");
        RelayOutcome::Dropped(reason)
    }
}

use dashmap::DashMap;
use rendezvous_core::{ConnectionId, Payload};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct OfferCacheEntry {
    pub payload: Payload,
    pub stored_at: Instant,
}

impl OfferCacheEntry {
    fn is_live(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Last offer of each connection, eligible for replay while younger than the TTL.
///
/// Expiry is lazy: reads skip stale entries, and `evict_expired` only reclaims memory.
pub struct OfferCache {
    entries: DashMap<ConnectionId, OfferCacheEntry>,
    ttl: Duration,
}

impl OfferCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A newer offer from the same connection replaces the old one.
    pub fn put(&self, id: ConnectionId, payload: Payload, now: Instant) {
        self.entries.insert(
            id,
            OfferCacheEntry {
                payload,
                stored_at: now,
            },
        );
    }

    pub fn remove(&self, id: &ConnectionId) -> Option<OfferCacheEntry> {
        self.entries.remove(id).map(|(_, entry)| entry)
    }

    /// True while `id` has an unexpired offer.
    pub fn contains(&self, id: &ConnectionId, now: Instant) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.is_live(now, self.ttl))
    }

    /// Runs `f` on the unexpired offer of `id` while holding its entry, so a concurrent
    /// `put` for the same connection lands strictly before or after `f`.
    pub fn with_live<R>(
        &self,
        id: &ConnectionId,
        now: Instant,
        f: impl FnOnce(&Payload) -> R,
    ) -> Option<R> {
        let entry = self.entries.get(id)?;
        entry.is_live(now, self.ttl).then(|| f(&entry.payload))
    }

    /// Lazily yields unexpired offers. Holds shard read locks while iterating, so collect
    /// before awaiting.
    pub fn live_entries(
        &self,
        now: Instant,
    ) -> impl Iterator<Item = (ConnectionId, Payload)> + '_ {
        self.entries.iter().filter_map(move |entry| {
            entry
                .value()
                .is_live(now, self.ttl)
                .then(|| (*entry.key(), entry.value().payload.clone()))
        })
    }

    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn live_count(&self, now: Instant) -> usize {
        self.live_entries(now).count()
    }
}

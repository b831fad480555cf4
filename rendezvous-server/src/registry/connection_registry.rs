use crate::registry::PeerHandle;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use rendezvous_core::{ConnectionId, Payload};
use std::time::Duration;
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    DuplicateId(ConnectionId),
}

/// Result of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub failed: usize,
}

/// Every open signaling connection, keyed by id.
pub struct ConnectionRegistry {
    peers: DashMap<ConnectionId, PeerHandle>,
    send_timeout: Duration,
}

impl ConnectionRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            peers: DashMap::new(),
            send_timeout,
        }
    }

    pub fn register(&self, handle: PeerHandle) -> Result<(), RegistryError> {
        match self.peers.entry(handle.id()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateId(*entry.key())),
            Entry::Vacant(entry) => {
                entry.insert(handle);
                Ok(())
            }
        }
    }

    /// Idempotent. Returns the handle only to the caller that actually removed it.
    pub fn unregister(&self, id: &ConnectionId) -> Option<PeerHandle> {
        self.peers.remove(id).map(|(_, handle)| handle)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<PeerHandle> {
        self.peers.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.peers.iter().map(|entry| *entry.key()).collect()
    }

    /// Sends `payload` to every open connection except `sender`.
    pub async fn broadcast_except(&self, sender: &ConnectionId, payload: Payload) -> FanOut {
        self.for_each_except(sender, |_| true, payload).await
    }

    /// Sends `payload` to every open connection except `sender` for which `accept` holds.
    ///
    /// Targets are snapshotted first so no shard lock is held while sending. Each send is
    /// bounded by the send timeout and runs concurrently with the others; one stuck peer
    /// cannot hold up the rest. Failed targets stay registered: only their own lifecycle
    /// removes them.
    pub async fn for_each_except<F>(
        &self,
        sender: &ConnectionId,
        accept: F,
        payload: Payload,
    ) -> FanOut
    where
        F: Fn(&ConnectionId) -> bool,
    {
        let targets: Vec<PeerHandle> = self
            .peers
            .iter()
            .filter(|entry| entry.key() != sender && entry.value().is_open())
            .filter(|entry| accept(entry.key()))
            .map(|entry| entry.value().clone())
            .collect();

        let results = join_all(targets.iter().map(|target| {
            let payload = payload.clone();
            async move { (target.id(), target.deliver(payload, self.send_timeout).await) }
        }))
        .await;

        let mut report = FanOut::default();
        for (target, result) in results {
            match result {
                Ok(()) => {
                    trace!(from = %sender, to = %target, "queued for delivery");
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(from = %sender, to = %target, reason = %e, "send-failed");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

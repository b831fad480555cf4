use rendezvous_core::{ConnectionId, ConnectionState, Payload, SharedConnectionState};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("connection is {0}")]
    NotOpen(ConnectionState),

    #[error("outbound queue is closed")]
    Closed,

    #[error("outbound queue stayed full for {0:?}")]
    TimedOut(Duration),
}

/// Cheap, cloneable handle to one connection's outbound queue.
///
/// The queue is drained by the connection's own writer task, so a slow peer only ever
/// blocks its own queue.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Payload>,
    state: SharedConnectionState,
}

impl PeerHandle {
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Payload>) -> Self {
        Self {
            id,
            tx,
            state: SharedConnectionState::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> &SharedConnectionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open() && !self.tx.is_closed()
    }

    pub async fn deliver(&self, payload: Payload, timeout: Duration) -> Result<(), SendError> {
        let state = self.state.get();
        if state != ConnectionState::Open {
            return Err(SendError::NotOpen(state));
        }

        self.tx
            .send_timeout(payload, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => SendError::TimedOut(timeout),
                SendTimeoutError::Closed(_) => SendError::Closed,
            })
    }

    /// Waits for room in the queue. Sending through the returned permit never blocks, so
    /// the payload can be picked while holding a lock.
    pub async fn reserve(
        &self,
        timeout: Duration,
    ) -> Result<mpsc::Permit<'_, Payload>, SendError> {
        let state = self.state.get();
        if state != ConnectionState::Open {
            return Err(SendError::NotOpen(state));
        }

        match tokio::time::timeout(timeout, self.tx.reserve()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(SendError::Closed),
            Err(_) => Err(SendError::TimedOut(timeout)),
        }
    }
}

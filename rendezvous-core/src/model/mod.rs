mod connection;
mod signaling;

pub use connection::{ConnectionId, ConnectionState, SharedConnectionState};
pub use signaling::{IceCandidate, Payload, SessionDescription, Signal, SignalKind, SignalMessage};

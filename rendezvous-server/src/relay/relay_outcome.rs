use crate::registry::FanOut;
use rendezvous_core::{DecodeError, FrameError, SignalKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    Decode(DecodeError),
    Frame(FrameError),
    UnknownKind(String),
    Binary,
    SenderReleased,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Decode(e) => write!(f, "{}", e),
            DropReason::Frame(e) => write!(f, "{}", e),
            DropReason::UnknownKind(label) => write!(f, "unknown message type {}", label),
            DropReason::Binary => f.write_str("binary frames are not part of the protocol"),
            DropReason::SenderReleased => f.write_str("sender connection already released"),
        }
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Relayed { kind: SignalKind, fan_out: FanOut },
    Dropped(DropReason),
}

pub mod codec;
pub mod model;

pub use codec::{DecodeError, FrameAssembler, FrameError, decode};
pub use model::{
    ConnectionId, ConnectionState, IceCandidate, Payload, SessionDescription,
    SharedConnectionState, Signal, SignalKind, SignalMessage,
};

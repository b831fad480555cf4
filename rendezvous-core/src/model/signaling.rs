use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Verbatim text of a frame as it arrived on the wire. Relayed without re-serialization.
pub type Payload = Arc<str>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    pub sdp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    /// Empty string signals end-of-candidates.
    pub candidate: String,
    #[serde(rename = "sdpMid")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Offer(SessionDescription),
    Answer(SessionDescription),
    IceCandidate(IceCandidate),
    /// Discriminator the codec did not recognize, kept for logging.
    Unknown(String),
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Offer(_) => SignalKind::Offer,
            Signal::Answer(_) => SignalKind::Answer,
            Signal::IceCandidate(_) => SignalKind::IceCandidate,
            Signal::Unknown(_) => SignalKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    Unknown,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One decoded signaling frame together with the original text it was decoded from.
#[derive(Debug, Clone)]
pub struct SignalMessage {
    pub signal: Signal,
    pub raw: Payload,
}

impl SignalMessage {
    pub fn kind(&self) -> SignalKind {
        self.signal.kind()
    }
}

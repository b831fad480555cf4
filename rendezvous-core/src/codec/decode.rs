//! Text frame decoding.
//!
//! Frames are JSON objects carrying a `type` discriminator:
//!
//! ```text
//! { "type": 1 | "offer",  "sdp": "..." }
//! { "type": 2 | "answer", "sdp": "..." }
//! { "type": 3 | "candidate", "candidate": "...", "sdpMid": "0", "sdpMLineIndex": 0 }
//! ```
//!
//! A frame without a discriminator but with a `candidate` field is treated as an ICE
//! candidate, which is what browsers produce from `RTCIceCandidate.toJSON()`.

use crate::model::{IceCandidate, Payload, SessionDescription, Signal, SignalKind, SignalMessage};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed signaling payload: {0}")]
    Malformed(String),

    #[error("{0} message is missing its payload")]
    MissingPayload(SignalKind),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    // older clients spell the discriminator `kind`; `type` wins when both are present
    #[serde(rename = "kind", default)]
    legacy_kind: Option<Value>,
    #[serde(default)]
    sdp: Option<String>,
    #[serde(default)]
    candidate: Option<String>,
    #[serde(rename = "sdpMid", alias = "sdp_mid", default)]
    sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", alias = "sdp_m_line_index", default)]
    sdp_m_line_index: Option<u16>,
}

enum Discriminator {
    Offer,
    Answer,
    Candidate,
    Unrecognized(String),
}

fn classify(kind: Option<&Value>, has_candidate: bool) -> Discriminator {
    match kind {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Discriminator::Offer,
            Some(2) => Discriminator::Answer,
            Some(3) => Discriminator::Candidate,
            _ => Discriminator::Unrecognized(n.to_string()),
        },
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "offer" => Discriminator::Offer,
            "answer" => Discriminator::Answer,
            "candidate" | "ice-candidate" | "icecandidate" => Discriminator::Candidate,
            _ => Discriminator::Unrecognized(s.clone()),
        },
        None if has_candidate => Discriminator::Candidate,
        None => Discriminator::Unrecognized(String::from("<none>")),
        Some(other) => Discriminator::Unrecognized(other.to_string()),
    }
}

fn session_description(
    kind: SignalKind,
    sdp: Option<String>,
) -> Result<SessionDescription, DecodeError> {
    match sdp {
        Some(sdp) if !sdp.is_empty() => Ok(SessionDescription { sdp }),
        _ => Err(DecodeError::MissingPayload(kind)),
    }
}

/// Parses one complete text frame. Pure; the returned message keeps `raw` verbatim.
pub fn decode(raw: &str) -> Result<SignalMessage, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(DecodeError::Malformed(String::from("expected a JSON object")));
    }

    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let kind = envelope.kind.as_ref().or(envelope.legacy_kind.as_ref());
    let signal = match classify(kind, envelope.candidate.is_some()) {
        Discriminator::Offer => {
            Signal::Offer(session_description(SignalKind::Offer, envelope.sdp)?)
        }
        Discriminator::Answer => {
            Signal::Answer(session_description(SignalKind::Answer, envelope.sdp)?)
        }
        Discriminator::Candidate => {
            let candidate = envelope
                .candidate
                .ok_or(DecodeError::MissingPayload(SignalKind::IceCandidate))?;
            Signal::IceCandidate(IceCandidate {
                candidate,
                sdp_mid: envelope.sdp_mid,
                sdp_m_line_index: envelope.sdp_m_line_index,
            })
        }
        Discriminator::Unrecognized(label) => Signal::Unknown(label),
    };

    Ok(SignalMessage {
        signal,
        raw: Payload::from(raw),
    })
}

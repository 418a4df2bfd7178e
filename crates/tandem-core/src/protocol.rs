//! Signaling wire protocol.
//!
//! Every WebSocket text frame carries exactly one JSON object tagged by
//! `"type"`. Negotiation payloads (`offer`, `answer`, `candidate`) are produced
//! and consumed by the peers' real-time stack and pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SignalError;
use crate::id::SessionId;

/// Events sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Ask to be paired with the longest-waiting stranger.
    RequestPairing,

    NegotiationOffer {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        offer: Value,
    },

    NegotiationAnswer {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        answer: Value,
    },

    NetworkCandidate {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        candidate: Value,
    },

    ChatMessage {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        text: String,
    },

    /// Leave the current session, or stop waiting.
    LeaveSession,
}

impl ClientEvent {
    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self, SignalError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Split a session-scoped event into its relay envelope.
    /// Returns `None` for control events.
    pub fn into_envelope(self) -> Option<Envelope> {
        let (session_id, kind, body) = match self {
            ClientEvent::NegotiationOffer { session_id, offer } => {
                (session_id, RelayKind::Offer, offer)
            }
            ClientEvent::NegotiationAnswer { session_id, answer } => {
                (session_id, RelayKind::Answer, answer)
            }
            ClientEvent::NetworkCandidate {
                session_id,
                candidate,
            } => (session_id, RelayKind::Candidate, candidate),
            ClientEvent::ChatMessage { session_id, text } => {
                (session_id, RelayKind::Chat, Value::String(text))
            }
            ClientEvent::RequestPairing | ClientEvent::LeaveSession => return None,
        };
        Some(Envelope {
            session_id,
            kind,
            body,
        })
    }
}

/// Events sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// No partner yet; the connection is queued.
    Waiting,

    Matched {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },

    /// Sent to the member expected to create the first offer.
    InitiatorAssigned {
        #[serde(rename = "isInitiator")]
        is_initiator: bool,
    },

    NegotiationOffer { offer: Value },

    NegotiationAnswer { answer: Value },

    NetworkCandidate { candidate: Value },

    ChatMessage { text: String },

    /// The other member of the session left or lost its transport.
    PeerDisconnected,
}

impl ServerEvent {
    /// Event name as it appears in the `"type"` tag. Used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Waiting => "waiting",
            ServerEvent::Matched { .. } => "matched",
            ServerEvent::InitiatorAssigned { .. } => "initiator-assigned",
            ServerEvent::NegotiationOffer { .. } => "negotiation-offer",
            ServerEvent::NegotiationAnswer { .. } => "negotiation-answer",
            ServerEvent::NetworkCandidate { .. } => "network-candidate",
            ServerEvent::ChatMessage { .. } => "chat-message",
            ServerEvent::PeerDisconnected => "peer-disconnected",
        }
    }
}

/// Kind of a session-scoped payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayKind {
    Offer,
    Answer,
    Candidate,
    Chat,
}

/// A session-scoped payload on its way to the other member.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub session_id: SessionId,
    pub kind: RelayKind,
    pub body: Value,
}

impl Envelope {
    /// The event the receiving member sees: same kind, same body.
    pub fn into_server_event(self) -> ServerEvent {
        match self.kind {
            RelayKind::Offer => ServerEvent::NegotiationOffer { offer: self.body },
            RelayKind::Answer => ServerEvent::NegotiationAnswer { answer: self.body },
            RelayKind::Candidate => ServerEvent::NetworkCandidate {
                candidate: self.body,
            },
            RelayKind::Chat => ServerEvent::ChatMessage {
                text: match self.body {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
            },
        }
    }
}

//! Core protocol types: identities, frames, and acknowledgments.
//!
//! Every structure here is part of the wire format — it gets serialized,
//! sent over the connection, and deserialized on the other side. The JSON
//! shapes are pinned by the tests at the bottom of this file; the client
//! SDK depends on them.

use cardforge_engine::Card;
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::{ClientIntent, ServerEvent};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A verified player identity.
///
/// The value is opaque to this codebase: it is whatever the external auth
/// service vouched for during the handshake. The gateway stamps it onto
/// every intent, so a client can never act under another player's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A room code.
///
/// Room ids are chosen by clients (join is create-or-get), so they are
/// opaque strings rather than server-assigned counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies who should receive a broadcast event.
///
/// The game controller returns a list of `(Recipient, ServerEvent)` pairs;
/// the room actor interprets the recipient and fans the event out to the
/// matching member connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every member of the room, including the acting player.
    All,
    /// One specific player.
    Player(PlayerId),
    /// Everyone except the specified player.
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Membership summaries
// ---------------------------------------------------------------------------

/// One member in a room membership summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub player_id: PlayerId,
    pub player_name: String,
    pub connected: bool,
}

/// Room membership summary returned in the `join-room` acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub host_id: PlayerId,
    pub members: Vec<MemberSummary>,
}

// ---------------------------------------------------------------------------
// Acknowledgments
// ---------------------------------------------------------------------------

/// Operation-specific data carried in a successful acknowledgment.
///
/// The drawn card travels only here — broadcasts report hand sizes, never
/// another player's cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AckData {
    /// `join-room` succeeded; here is who you are playing with.
    RoomJoined { room: RoomSummary },
    /// `draw-card` succeeded; only the drawer learns what was drawn.
    CardDrawn { card: Card },
    /// `draw-card` accepted a pending wild-draw-four penalty instead.
    PenaltyDrawn { cards: Vec<Card> },
    /// `challenge` resolved; `success` means the accused was bluffing.
    ChallengeOutcome { success: bool },
}

/// The result of one correlated intent: success (with optional operation
/// data) or a structured failure with a stable error tag.
///
/// Failures are acknowledged to the sender only — they are never broadcast
/// to other room members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AckResult {
    Ok {
        data: Option<AckData>,
    },
    Err {
        /// Stable machine-readable tag, e.g. `"NotYourTurn"`.
        code: String,
        message: String,
    },
}

impl AckResult {
    /// Shorthand for a success with no payload.
    pub fn ok() -> Self {
        Self::Ok { data: None }
    }

    /// Shorthand for a success carrying operation data.
    pub fn with(data: AckData) -> Self {
        Self::Ok { data: Some(data) }
    }

    /// Shorthand for a failure.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Err {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Frames — the top-level wire format
// ---------------------------------------------------------------------------

/// Everything a client can send, tagged by `frame`.
///
/// The first frame on a fresh connection must be `hello`; every frame after
/// that is an `intent` carrying a correlation id the gateway echoes back in
/// the matching acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// Opens the connection: protocol version + auth credential.
    Hello { version: u32, token: String },
    /// A correlated player intent.
    Intent {
        correlation: u64,
        intent: ClientIntent,
    },
}

/// Everything the gateway can send, tagged by `frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// Handshake accepted; the verified identity and a reconnect token.
    Welcome {
        player_id: PlayerId,
        reconnect_token: String,
    },
    /// Synchronous acknowledgment of one intent.
    Ack { correlation: u64, result: AckResult },
    /// A broadcast event fanned out to room members.
    Event { event: ServerEvent },
    /// A connection-level error outside any correlation (e.g. a rejected
    /// handshake).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire protocol defines exact JSON shapes. These tests verify the
    //! serde attributes produce them, because a mismatch means the client
    //! can't parse our frames.

    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("p-42")).unwrap();
        assert_eq!(json, "\"p-42\"");
    }

    #[test]
    fn test_room_id_round_trip() {
        let id = RoomId::from("lobby-7");
        let json = serde_json::to_string(&id).unwrap();
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_client_hello_json_format() {
        let frame = ClientFrame::Hello {
            version: 1,
            token: "abc".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["frame"], "hello");
        assert_eq!(json["version"], 1);
        assert_eq!(json["token"], "abc");
    }

    #[test]
    fn test_intent_frame_json_format() {
        let frame = ClientFrame::Intent {
            correlation: 9,
            intent: ClientIntent::DrawCard {
                room_id: RoomId::from("r1"),
            },
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["frame"], "intent");
        assert_eq!(json["correlation"], 9);
        assert_eq!(json["intent"]["type"], "draw-card");
        assert_eq!(json["intent"]["room_id"], "r1");
    }

    #[test]
    fn test_ack_ok_json_format() {
        let frame = ServerFrame::Ack {
            correlation: 3,
            result: AckResult::ok(),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["frame"], "ack");
        assert_eq!(json["correlation"], 3);
        assert_eq!(json["result"]["status"], "ok");
        assert!(json["result"]["data"].is_null());
    }

    #[test]
    fn test_ack_err_carries_stable_code() {
        let frame = ServerFrame::Ack {
            correlation: 4,
            result: AckResult::err("NotYourTurn", "it is not your turn"),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["result"]["status"], "err");
        assert_eq!(json["result"]["code"], "NotYourTurn");
    }

    #[test]
    fn test_welcome_round_trip() {
        let frame = ServerFrame::Welcome {
            player_id: PlayerId::from("p1"),
            reconnect_token: "deadbeef".into(),
        };
        let bytes = serde_json::to_vec(&frame).unwrap();
        let back: ServerFrame = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(frame, back);
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientFrame, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_frame_tag_returns_error() {
        let unknown = r#"{"frame": "teleport", "speed": 9000}"#;
        let result: Result<ClientFrame, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }
}

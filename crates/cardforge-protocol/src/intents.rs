//! Inbound player intents.
//!
//! Each intent is a tagged variant with validated fields; malformed
//! payloads fail at decode time and never reach the state machine. The
//! acting player is deliberately absent from every payload — the gateway
//! attaches the connection's authenticated identity when routing.

use cardforge_engine::{CardColor, CardId};
use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomId};

/// A player intent, tagged with the wire name of the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientIntent {
    /// Join (or create) a room.
    JoinRoom {
        room_id: RoomId,
        player_name: String,
    },

    /// Start the match. Host-only; requires at least two members.
    StartGame { room_id: RoomId },

    /// Play a card from hand. Wild and WildDrawFour plays must carry a
    /// concrete `declared_color`.
    PlayCard {
        room_id: RoomId,
        card_id: CardId,
        declared_color: Option<CardColor>,
    },

    /// Draw one card from the pile. While a challenge window is open
    /// against the previous player, this instead accepts the four-card
    /// penalty.
    DrawCard { room_id: RoomId },

    /// Declare UNO. Legal only with exactly one card in hand.
    CallUno { room_id: RoomId },

    /// Contest the legality of the pending WildDrawFour played by
    /// `target_player_id`.
    Challenge {
        room_id: RoomId,
        target_player_id: PlayerId,
    },

    /// Leave the room. Fire-and-forget; the gateway still acknowledges it
    /// when a correlation id is supplied.
    LeaveRoom { room_id: RoomId },
}

impl ClientIntent {
    /// The room this intent is addressed to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::StartGame { room_id }
            | Self::PlayCard { room_id, .. }
            | Self::DrawCard { room_id }
            | Self::CallUno { room_id }
            | Self::Challenge { room_id, .. }
            | Self::LeaveRoom { room_id } => room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_room_json_format() {
        let intent = ClientIntent::JoinRoom {
            room_id: RoomId::from("r1"),
            player_name: "Ada".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "join-room");
        assert_eq!(json["room_id"], "r1");
        assert_eq!(json["player_name"], "Ada");
    }

    #[test]
    fn test_play_card_with_declared_color_round_trip() {
        let intent = ClientIntent::PlayCard {
            room_id: RoomId::from("r1"),
            card_id: CardId(104),
            declared_color: Some(CardColor::Blue),
        };
        let bytes = serde_json::to_vec(&intent).unwrap();
        let back: ClientIntent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(intent, back);
    }

    #[test]
    fn test_play_card_without_declared_color() {
        let json = r#"{"type":"play-card","room_id":"r1","card_id":3,"declared_color":null}"#;
        let intent: ClientIntent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            intent,
            ClientIntent::PlayCard {
                declared_color: None,
                ..
            }
        ));
    }

    #[test]
    fn test_challenge_json_format() {
        let intent = ClientIntent::Challenge {
            room_id: RoomId::from("r1"),
            target_player_id: PlayerId::from("p2"),
        };
        let json: serde_json::Value = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "challenge");
        assert_eq!(json["target_player_id"], "p2");
    }

    #[test]
    fn test_room_id_accessor_covers_every_variant() {
        let room = RoomId::from("r9");
        let intents = [
            ClientIntent::JoinRoom {
                room_id: room.clone(),
                player_name: "x".into(),
            },
            ClientIntent::StartGame {
                room_id: room.clone(),
            },
            ClientIntent::DrawCard {
                room_id: room.clone(),
            },
            ClientIntent::CallUno {
                room_id: room.clone(),
            },
            ClientIntent::LeaveRoom {
                room_id: room.clone(),
            },
        ];
        for intent in &intents {
            assert_eq!(intent.room_id(), &room);
        }
    }
}

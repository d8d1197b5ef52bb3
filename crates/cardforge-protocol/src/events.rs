//! Outbound broadcast events.
//!
//! Successful intents always broadcast, including to the acting player's
//! own connection — there is no special-casing of the sender. Rejected
//! intents never produce an event, only an acknowledgment.

use cardforge_engine::{Card, CardColor, Direction};
use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// One seat as visible to every room member: identity and hand size, never
/// the cards themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    pub player_id: PlayerId,
    pub player_name: String,
    pub hand_size: usize,
    pub score: u32,
    pub connected: bool,
}

/// Final round score for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub score: u32,
}

/// A broadcast event, tagged with its wire name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    PlayerJoined {
        player_id: PlayerId,
        player_name: String,
        total_players: usize,
    },

    PlayerLeft {
        player_id: PlayerId,
        remaining_players: usize,
    },

    /// Transport-level drop. The seat (hand, score) survives under the
    /// player id until an explicit leave.
    PlayerDisconnected { player_id: PlayerId },

    /// Host reassigned after the previous host departed.
    HostChanged { host_id: PlayerId },

    /// The match began. Personalized per recipient: `hand` is the
    /// recipient's own cards; everyone else appears in `seats` as a hand
    /// size only.
    GameStarted {
        hand: Vec<Card>,
        seats: Vec<SeatSummary>,
        top_card: Card,
        current_player: PlayerId,
        direction: Direction,
    },

    CardPlayed {
        player_id: PlayerId,
        card: Card,
        declared_color: Option<CardColor>,
        hand_size: usize,
        current_player: PlayerId,
    },

    /// A player took cards from the draw pile. `count` > 1 for penalty
    /// draws (DrawTwo, WildDrawFour, challenge outcomes). The cards
    /// themselves are only revealed to the drawer, via the ack.
    CardDrawn {
        player_id: PlayerId,
        count: usize,
        hand_size: usize,
        current_player: PlayerId,
    },

    /// Informational: a player is down to one card.
    UnoAlert { player_id: PlayerId },

    UnoCalled { player_id: PlayerId },

    ChallengeResult {
        challenger_id: PlayerId,
        target_id: PlayerId,
        success: bool,
        penalty: usize,
        current_player: PlayerId,
    },

    GameFinished {
        winner_id: PlayerId,
        scores: Vec<ScoreEntry>,
    },
}

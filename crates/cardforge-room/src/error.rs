//! Error types for the room layer.
//!
//! Every violated precondition maps to a named variant with a stable tag
//! (`code()`), returned to the caller as a structured acknowledgment and
//! never broadcast. Rule violations are always recoverable; only broken
//! internal invariants (card conservation) are treated as bugs, and those
//! are logged and asserted rather than surfaced here.

use cardforge_engine::DeckError;
use cardforge_protocol::{PlayerId, RoomId};

/// Errors from room membership and routing.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The player is not a member of this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// The room's command channel is gone (actor shut down mid-request).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// A game-rule rejection from the session controller.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl RoomError {
    /// Stable machine-readable tag for acknowledgments.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "RoomNotFound",
            Self::NotInRoom(..) => "NotInRoom",
            Self::Unavailable(_) => "RoomUnavailable",
            Self::Game(e) => e.code(),
        }
    }
}

/// Rule rejections from the game session controller. Each one leaves the
/// game state untouched — operations are all-or-nothing.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Fewer than two members present at start.
    #[error("not enough players to start ({have} joined, 2 required)")]
    NotEnoughPlayers { have: usize },

    /// The match already started.
    #[error("game already started")]
    AlreadyStarted,

    /// The operation requires a running match.
    #[error("game is not in progress")]
    GameNotInProgress,

    /// Only the host may start the match.
    #[error("only the host can start the game")]
    NotHost,

    /// The acting player does not hold the current turn.
    #[error("not your turn")]
    NotYourTurn,

    /// The referenced card is not in the acting player's hand.
    #[error("card not in hand")]
    CardNotInHand,

    /// The play violates move legality (or a play was attempted while a
    /// challenge window is open).
    #[error("invalid move")]
    InvalidMove,

    /// A Wild or WildDrawFour was played without a concrete declared color.
    #[error("a wild play must declare a color")]
    MissingColorDeclaration,

    /// UNO can only be called with exactly one card in hand.
    #[error("cannot call uno")]
    CannotCallUno,

    /// Draw pile and discard pile are both exhausted.
    #[error("no cards available to draw")]
    NoCardsAvailable,

    /// No challenge window is open for this challenger/target pair, or the
    /// window already closed.
    #[error("challenge not applicable")]
    ChallengeNotApplicable,

    /// Deck construction/dealing failed.
    #[error(transparent)]
    Deck(#[from] DeckError),
}

impl GameError {
    /// Stable machine-readable tag for acknowledgments.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotEnoughPlayers { .. } => "NotEnoughPlayers",
            Self::AlreadyStarted => "AlreadyStarted",
            Self::GameNotInProgress => "GameNotInProgress",
            Self::NotHost => "NotHost",
            Self::NotYourTurn => "NotYourTurn",
            Self::CardNotInHand => "CardNotInHand",
            Self::InvalidMove => "InvalidMove",
            Self::MissingColorDeclaration => "MissingColorDeclaration",
            Self::CannotCallUno => "CannotCallUno",
            Self::NoCardsAvailable => "NoCardsAvailable",
            Self::ChallengeNotApplicable => "ChallengeNotApplicable",
            Self::Deck(_) => "DeckError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable_tags() {
        assert_eq!(GameError::NotYourTurn.code(), "NotYourTurn");
        assert_eq!(GameError::NotEnoughPlayers { have: 1 }.code(), "NotEnoughPlayers");
        assert_eq!(
            RoomError::NotFound(RoomId::from("r1")).code(),
            "RoomNotFound"
        );
        assert_eq!(
            RoomError::Game(GameError::InvalidMove).code(),
            "InvalidMove"
        );
    }

    #[test]
    fn test_game_error_converts_into_room_error() {
        let err: RoomError = GameError::CannotCallUno.into();
        assert!(matches!(err, RoomError::Game(GameError::CannotCallUno)));
        assert!(err.to_string().contains("cannot call uno"));
    }
}

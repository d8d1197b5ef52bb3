//! Room lifecycle and the game session controller for Cardforge.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! membership and its match state. All intents for one room are applied
//! strictly sequentially; rooms never block each other.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates, finds, and destroys rooms
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`GameState`] — the authoritative match state machine
//! - [`GameIntent`] / [`IntentOutcome`] — validated operations and their
//!   acknowledgment payloads
//! - [`RoomError`] / [`GameError`] — the rejection taxonomy

mod error;
mod game;
mod registry;
mod room;

pub use error::{GameError, RoomError};
pub use game::{
    DrawOutcome, GameConfig, GameState, GameStatus, MatchResult, PendingChallenge, Seat,
};
pub use registry::RoomRegistry;
pub use room::{GameIntent, IntentOutcome, MemberSender, RoomHandle, RoomInfo};

//! Wire protocol for Cardforge.
//!
//! This crate defines the "language" that clients and the gateway speak:
//!
//! - **Types** ([`ClientFrame`], [`ServerFrame`], [`ClientIntent`],
//!   [`ServerEvent`], identity newtypes) — the structures that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room layer
//! (game state). It doesn't know about connections or rooms — it only knows
//! how to describe and serialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (frames) → Rooms (validated intents)
//! ```

mod codec;
mod error;
mod events;
mod intents;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ScoreEntry, SeatSummary, ServerEvent};
pub use intents::ClientIntent;
pub use types::{
    AckData, AckResult, ClientFrame, MemberSummary, PlayerId, Recipient,
    RoomId, RoomSummary, ServerFrame,
};

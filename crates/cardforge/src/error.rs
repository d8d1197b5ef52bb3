//! Unified error type for the gateway.

use cardforge_protocol::ProtocolError;
use cardforge_room::RoomError;
use cardforge_session::SessionError;

use crate::ws::TransportError;

/// Top-level error wrapping every layer's failures. The `#[from]` impls
/// let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (auth, reconnect, expired).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (membership, routing, game rules).
    #[error(transparent)]
    Room(#[from] RoomError),
}

//! # Cardforge
//!
//! Authoritative real-time server for an UNO-style card game. Clients
//! connect over WebSocket, authenticate through an external identity
//! provider, and exchange correlated intents and broadcast events; every
//! rule is re-validated server-side, so the in-memory room state is the
//! single source of truth clients must agree with.
//!
//! ```text
//! client intent → gateway (this crate) → room actor (validate + mutate)
//!              → broadcast fan-out to every member connection
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cardforge::{ServerBuilder, PassthroughAuth};
//!
//! # async fn run() -> Result<(), cardforge::GatewayError> {
//! let server = ServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(PassthroughAuth)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod store;
mod ws;

pub use error::GatewayError;
pub use server::{PROTOCOL_VERSION, Server, ServerBuilder};
pub use store::{MatchStore, NoopStore};
pub use ws::{ConnectionId, TransportError, WsConnection, WsListener};

pub use cardforge_protocol as protocol;
pub use cardforge_room as room;
pub use cardforge_session::{Authenticator, SessionConfig, SessionError};

use cardforge_protocol::PlayerId;

/// Accepts any non-empty token and uses it verbatim as the player id.
/// Development and tests only — production supplies a real
/// [`Authenticator`] backed by the identity service.
pub struct PassthroughAuth;

impl Authenticator for PassthroughAuth {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, SessionError> {
        if token.is_empty() {
            return Err(SessionError::AuthFailed("empty token".into()));
        }
        Ok(PlayerId(token.to_owned()))
    }
}

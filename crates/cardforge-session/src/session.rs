//! Session types.

use std::time::Instant;

use cardforge_protocol::PlayerId;

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long (in seconds) a disconnected player has to reconnect before
    /// their session is expired. 0 disables reconnection.
    pub reconnect_grace_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_secs: 30,
        }
    }
}

/// The current state of a player's session.
///
/// ```text
///   Connected ──(disconnect)──→ Disconnected ──(timeout)──→ Expired
///       ↑                            │
///       └────────(reconnect)─────────┘
/// ```
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Actively connected.
    Connected,
    /// Connection dropped at `since`; reconnectable until the grace period
    /// elapses.
    Disconnected { since: Instant },
    /// Grace period elapsed; the session is dead and awaits cleanup.
    Expired,
}

/// One player's session record.
///
/// The session outlives the transport connection: a dropped socket keeps
/// its session in `Disconnected` so a reconnect can re-bind to the same
/// in-flight game.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub state: SessionState,
    /// Secret presented on reconnect instead of re-authenticating.
    /// 32 hex characters (128 bits of entropy).
    pub reconnect_token: String,
}

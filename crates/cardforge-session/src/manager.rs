//! The session manager: tracks all active player sessions.
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself — it is owned by the
//! gateway and accessed behind a mutex at that level. No hidden locking
//! here.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use cardforge_protocol::PlayerId;
use rand::Rng;

use crate::{Session, SessionConfig, SessionError, SessionState};

/// Registry of every player currently connected (or recently disconnected).
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    /// Reconnection-token index, kept in sync with `sessions`.
    tokens: HashMap<String, PlayerId>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a new, empty session manager.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            tokens: HashMap::new(),
            config,
        }
    }

    /// Creates a session for a freshly authenticated player, generating a
    /// reconnection token.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the player already has a
    /// Connected session. A Disconnected or Expired session is replaced.
    pub fn create(&mut self, player_id: PlayerId) -> Result<&Session, SessionError> {
        if let Some(existing) = self.sessions.get(&player_id) {
            if matches!(existing.state, SessionState::Connected) {
                return Err(SessionError::AlreadyConnected(player_id));
            }
            self.tokens.remove(&existing.reconnect_token);
        }

        let token = generate_token();
        let session = Session {
            player_id: player_id.clone(),
            state: SessionState::Connected,
            reconnect_token: token.clone(),
        };

        self.tokens.insert(token, player_id.clone());
        self.sessions.insert(player_id.clone(), session);

        tracing::info!(%player_id, "session created");

        Ok(self
            .sessions
            .get(&player_id)
            .expect("just inserted"))
    }

    /// Marks a player as disconnected, starting the grace period.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session exists.
    pub fn disconnect(&mut self, player_id: &PlayerId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(player_id)
            .ok_or_else(|| SessionError::NotFound(player_id.clone()))?;

        session.state = SessionState::Disconnected {
            since: Instant::now(),
        };

        tracing::info!(%player_id, "player disconnected, grace period started");
        Ok(())
    }

    /// Reconnects a player using their reconnection token.
    ///
    /// # Errors
    /// - [`SessionError::InvalidToken`] — token not recognized
    /// - [`SessionError::SessionExpired`] — grace period elapsed
    /// - [`SessionError::AlreadyConnected`] — session never dropped
    pub fn reconnect(&mut self, token: &str) -> Result<&Session, SessionError> {
        let player_id = self
            .tokens
            .get(token)
            .cloned()
            .ok_or(SessionError::InvalidToken)?;

        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::InvalidToken)?;

        match &session.state {
            SessionState::Disconnected { since } => {
                let grace = Duration::from_secs(self.config.reconnect_grace_secs);
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    return Err(SessionError::SessionExpired(player_id));
                }
                session.state = SessionState::Connected;
                tracing::info!(%player_id, "player reconnected");
                Ok(self.sessions.get(&player_id).expect("just modified"))
            }
            SessionState::Connected => Err(SessionError::AlreadyConnected(player_id)),
            SessionState::Expired => Err(SessionError::SessionExpired(player_id)),
        }
    }

    /// Expires every disconnected session past the grace period. Returns
    /// the expired player ids so higher layers can react before cleanup.
    pub fn expire_stale(&mut self) -> Vec<PlayerId> {
        let grace = Duration::from_secs(self.config.reconnect_grace_secs);
        let mut expired = Vec::new();

        for session in self.sessions.values_mut() {
            if let SessionState::Disconnected { since } = &session.state {
                if since.elapsed() > grace {
                    session.state = SessionState::Expired;
                    expired.push(session.player_id.clone());
                    tracing::info!(
                        player_id = %session.player_id,
                        "session expired (grace period elapsed)"
                    );
                }
            }
        }

        expired
    }

    /// Removes all expired sessions and invalidates their tokens.
    pub fn cleanup_expired(&mut self) {
        self.sessions.retain(|_, session| {
            if matches!(session.state, SessionState::Expired) {
                self.tokens.remove(&session.reconnect_token);
                false
            } else {
                true
            }
        });
    }

    /// Looks up a session by player id.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Number of sessions in any state.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Random 32-character hex string (128 bits of entropy) — infeasible to
/// guess, so presenting it proves the client held the original session.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================

//! Player session management for Cardforge.
//!
//! Identity verification itself is an external collaborator — this crate
//! only defines the seam ([`Authenticator`]) and tracks what the gateway
//! needs to know about each verified player:
//!
//! 1. **Session tracking** — who is currently connected ([`SessionManager`])
//! 2. **Reconnection** — a dropped connection keeps its session for a grace
//!    period and can resume with a token, re-binding to any in-flight hand
//!
//! ```text
//! Gateway (above)  ← authenticates on handshake, disconnects on drop
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below)  ← provides PlayerId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;

pub use auth::Authenticator;
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionState};

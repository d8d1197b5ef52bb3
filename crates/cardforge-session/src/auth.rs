//! Authentication seam.
//!
//! Cardforge never verifies credentials itself. The gateway calls the
//! [`Authenticator`] during the handshake and trusts whatever identity it
//! returns; production plugs in a JWT validator or an auth API client,
//! tests use a passthrough.

use cardforge_protocol::PlayerId;

use crate::SessionError;

/// Validates a client's credential and returns their verified identity.
///
/// # Example
///
/// ```rust
/// use cardforge_session::{Authenticator, SessionError};
/// use cardforge_protocol::PlayerId;
///
/// /// Accepts any non-empty token and uses it as the player id.
/// /// Development only.
/// struct PassthroughAuth;
///
/// impl Authenticator for PassthroughAuth {
///     async fn authenticate(
///         &self,
///         token: &str,
///     ) -> Result<PlayerId, SessionError> {
///         if token.is_empty() {
///             return Err(SessionError::AuthFailed("empty token".into()));
///         }
///         Ok(PlayerId(token.to_owned()))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `token` and returns the player's identity.
    ///
    /// # Errors
    /// [`SessionError::AuthFailed`] when the credential is invalid or
    /// expired.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, SessionError>> + Send;
}

//! Identity platform port

use async_trait::async_trait;
use tokenbridge_domain::{PlatformSession, PlatformToken, SignInError};

/// Port for the identity platform's custom-token sign-in and its
/// current-session state.
///
/// The session is owned by the implementation; callers never mutate it
/// except through `sign_in` and `sign_out`.
#[async_trait]
pub trait PlatformAuth: Send + Sync {
    /// Signs in with a custom token.
    ///
    /// On success the current session is replaced. On failure it is left
    /// untouched.
    ///
    /// # Errors
    /// Returns `SignInError` if the platform refuses the token or cannot
    /// be reached.
    async fn sign_in(&self, token: &PlatformToken) -> Result<PlatformSession, SignInError>;

    /// The signed-in session, if any.
    async fn current_session(&self) -> Option<PlatformSession>;

    /// Clears the current session.
    async fn sign_out(&self);
}

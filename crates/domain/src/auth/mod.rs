//! Authentication domain types
//!
//! Provider credentials and the outcome of a login attempt.

mod credential;
mod login;

pub use credential::{OAuthEchoHeaders, ProviderCredential, ProviderKind, token_preview};
pub use login::{LoginError, LoginErrorKind, LoginOutcome, ProviderFailure};

//! Tokenbridge Domain - Core business types
//!
//! This crate defines the domain model for exchanging a third-party
//! provider access token for an identity platform session.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod exchange;
pub mod id;
pub mod session;
pub mod settings;

pub use auth::{
    LoginError, LoginErrorKind, LoginOutcome, OAuthEchoHeaders, ProviderCredential,
    ProviderFailure, ProviderKind, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use exchange::{
    ExchangeError, ExchangeErrorBody, ExchangeRequest, ExchangeResponse, PlatformToken,
};
pub use id::AttemptId;
pub use session::{PlatformSession, SignInError};
pub use settings::{
    DEFAULT_IDENTITY_TOOLKIT_ENDPOINT, DEFAULT_TIMEOUT_MS, DEFAULT_VERIFY_PATH, ExchangeMode,
    ExchangeSettings, PlatformSettings, ProviderSettings, Settings,
};

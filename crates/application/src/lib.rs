//! Tokenbridge Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits for the provider SDK, the exchange endpoint and the
//!   identity platform
//! - Login flow state tracking and attempt guarding
//! - The `CompleteLogin` and `SignOut` use cases

pub mod auth;
pub mod error;
pub mod ports;
pub mod use_cases;

pub use auth::{AttemptGuard, LoginState, SessionEpoch};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{Clock, PlatformAuth, ProviderLogin, TokenExchange};
pub use use_cases::{CompleteLogin, LoginCallback, SignOut};

//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the login flow and the external
//! collaborators it treats as black boxes: the provider SDK, the trusted
//! exchange endpoint and the identity platform.

mod clock;
mod platform_auth;
mod provider_login;
mod token_exchange;

pub use clock::Clock;
pub use platform_auth::PlatformAuth;
pub use provider_login::ProviderLogin;
pub use token_exchange::TokenExchange;

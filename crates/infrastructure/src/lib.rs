//! Tokenbridge Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer:
//! - the reqwest client for the token verification endpoint
//! - Identity Toolkit and in-memory identity platforms
//! - static and UI-driven provider logins
//! - the layered settings loader

pub mod adapters;
pub mod auth;
pub mod provider;
pub mod settings;

pub use adapters::{ReqwestExchangeClient, SystemClock};
pub use auth::{IdentityToolkitAuth, InMemoryPlatformAuth};
pub use provider::{ChannelProviderLogin, LoginResultSender, StaticProviderLogin, channel_login};
pub use settings::{SettingsError, SettingsLoader};

//! Identity platform adapters.
//!
//! This module provides implementations of the `PlatformAuth` port:
//! - Identity Toolkit REST custom-token sign-in
//! - An in-memory platform for demos and tests

mod claims;
mod identity_toolkit;
mod in_memory;

pub use identity_toolkit::IdentityToolkitAuth;
pub use in_memory::InMemoryPlatformAuth;

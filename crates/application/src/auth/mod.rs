//! Login flow bookkeeping.
//!
//! This module provides:
//! - Observable login state for UI updates
//! - A single-flight guard for login attempts
//! - A session epoch used to detect sign-out races

mod attempt;
mod state;

pub use attempt::{AttemptGuard, SessionEpoch};
pub use state::LoginState;

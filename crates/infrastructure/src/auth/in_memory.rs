//! In-memory identity platform.
//!
//! Keeps the current session in process memory. Custom tokens are
//! resolved to uids through registered accounts, then the `uid` claim
//! that custom tokens carry. Any other non-empty token is its own uid.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokenbridge_application::{Clock, PlatformAuth};
use tokenbridge_domain::{PlatformSession, PlatformToken, SignInError};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::claims::{decode_unverified, string_claim};
use crate::adapters::SystemClock;

/// Identity platform that lives entirely in memory.
pub struct InMemoryPlatformAuth {
    clock: Arc<dyn Clock>,
    accounts: HashMap<String, String>,
    session: RwLock<Option<PlatformSession>>,
    next_failure: Mutex<Option<SignInError>>,
}

impl InMemoryPlatformAuth {
    /// Creates an empty platform using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            accounts: HashMap::new(),
            session: RwLock::new(None),
            next_failure: Mutex::new(None),
        }
    }

    /// Uses the given clock to stamp sessions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Maps a custom token to a uid.
    #[must_use]
    pub fn with_account(mut self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        self.accounts.insert(token.into(), uid.into());
        self
    }

    /// Makes the next `sign_in` fail with `error`.
    pub fn fail_next_sign_in(&self, error: SignInError) {
        *self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    fn resolve(&self, token: &str) -> Result<PlatformSession, SignInError> {
        if let Some(uid) = self.accounts.get(token) {
            return Ok(PlatformSession::new(uid.clone(), self.clock.now()));
        }

        let Some(claims) = decode_unverified(token) else {
            return Ok(PlatformSession::new(token.to_string(), self.clock.now()));
        };
        let uid = string_claim(&claims, "uid")
            .ok_or_else(|| SignInError::InvalidToken("custom token carries no uid".to_string()))?;

        let mut session = PlatformSession::new(uid, self.clock.now());
        let provider = claims
            .get("claims")
            .and_then(|c| c.get("provider"))
            .and_then(serde_json::Value::as_str);
        if let Some(provider) = provider {
            session = session.with_provider_id(provider.to_lowercase());
        }
        Ok(session)
    }
}

impl Default for InMemoryPlatformAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformAuth for InMemoryPlatformAuth {
    async fn sign_in(&self, token: &PlatformToken) -> Result<PlatformSession, SignInError> {
        if token.is_empty() {
            return Err(SignInError::InvalidToken("custom token is empty".to_string()));
        }

        let scripted = self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(error) = scripted {
            return Err(error);
        }

        let session = self.resolve(token.as_str())?;
        debug!(token = %token.preview(), uid = %session.uid, "custom token accepted");

        *self.session.write().await = Some(session.clone());
        info!(uid = %session.uid, "platform session started");
        Ok(session)
    }

    async fn current_session(&self) -> Option<PlatformSession> {
        self.session.read().await.clone()
    }

    async fn sign_out(&self) {
        if let Some(session) = self.session.write().await.take() {
            info!(uid = %session.uid, "platform session ended");
        }
    }
}

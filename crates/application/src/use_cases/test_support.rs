//! Hand-written port doubles shared by the use case tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokenbridge_domain::{
    ExchangeError, LoginError, LoginErrorKind, LoginOutcome, PlatformSession, PlatformToken,
    ProviderCredential, ProviderFailure, ProviderKind, SignInError,
};
use tokio::sync::Notify;

use super::LoginCallback;
use crate::auth::SessionEpoch;
use crate::ports::{PlatformAuth, ProviderLogin, TokenExchange};

/// Provider that replays queued outcomes, `Cancelled` once exhausted.
pub struct MockProvider {
    outcomes: Mutex<VecDeque<LoginOutcome>>,
    gate: Option<Arc<Notify>>,
    logout_failure: Option<ProviderFailure>,
    pub calls: AtomicUsize,
    pub logouts: AtomicUsize,
}

impl MockProvider {
    pub fn new(outcomes: Vec<LoginOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            gate: None,
            logout_failure: None,
            calls: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
        }
    }

    /// Blocks `login` until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn failing_logout(mut self, failure: ProviderFailure) -> Self {
        self.logout_failure = Some(failure);
        self
    }
}

#[async_trait]
impl ProviderLogin for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Line
    }

    async fn login(&self) -> LoginOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .expect("Lock poisoned")
            .pop_front()
            .unwrap_or(LoginOutcome::Cancelled)
    }

    async fn logout(&self) -> Result<(), ProviderFailure> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.logout_failure.clone().map_or(Ok(()), Err)
    }
}

enum Reply {
    Fixed(String),
    Echo,
    Failing(ExchangeError),
}

/// Exchange endpoint double recording every provider token it receives.
pub struct MockExchange {
    mode: Reply,
    sign_out_epoch: Option<SessionEpoch>,
    calls: Mutex<Vec<String>>,
    user_ids: Mutex<Vec<Option<String>>>,
}

impl MockExchange {
    fn with_mode(mode: Reply) -> Self {
        Self {
            mode,
            sign_out_epoch: None,
            calls: Mutex::new(Vec::new()),
            user_ids: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `token`.
    pub fn fixed(token: &str) -> Self {
        Self::with_mode(Reply::Fixed(token.to_string()))
    }

    /// Answers `platform-<provider token>`.
    pub fn echo() -> Self {
        Self::with_mode(Reply::Echo)
    }

    pub fn failing(error: ExchangeError) -> Self {
        Self::with_mode(Reply::Failing(error))
    }

    /// Simulates a sign-out landing while the exchange is in flight.
    pub fn signing_out_with(mut self, epoch: SessionEpoch) -> Self {
        self.sign_out_epoch = Some(epoch);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("Lock poisoned").clone()
    }

    /// Provider user ids seen through `exchange_credential`.
    pub fn user_ids(&self) -> Vec<Option<String>> {
        self.user_ids.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl TokenExchange for MockExchange {
    async fn exchange(&self, provider_token: &str) -> Result<PlatformToken, ExchangeError> {
        self.calls
            .lock()
            .expect("Lock poisoned")
            .push(provider_token.to_string());
        if let Some(epoch) = &self.sign_out_epoch {
            epoch.advance();
        }
        match &self.mode {
            Reply::Fixed(token) => Ok(PlatformToken::new(token.clone())),
            Reply::Echo => Ok(PlatformToken::new(format!("platform-{provider_token}"))),
            Reply::Failing(error) => Err(error.clone()),
        }
    }

    async fn exchange_credential(
        &self,
        credential: &ProviderCredential,
    ) -> Result<PlatformToken, ExchangeError> {
        self.user_ids
            .lock()
            .expect("Lock poisoned")
            .push(credential.user_id().map(str::to_string));
        self.exchange(credential.access_token()).await
    }
}

/// Platform double deriving the uid from the custom token (`uid-<token>`).
pub struct MockPlatform {
    session: Mutex<Option<PlatformSession>>,
    next_failure: Mutex<Option<SignInError>>,
    sign_in_tokens: Mutex<Vec<String>>,
    sign_out_epoch: Option<SessionEpoch>,
    pub sign_outs: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
            next_failure: Mutex::new(None),
            sign_in_tokens: Mutex::new(Vec::new()),
            sign_out_epoch: None,
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn with_session(self, session: PlatformSession) -> Self {
        *self.session.lock().expect("Lock poisoned") = Some(session);
        self
    }

    /// Simulates a sign-out landing right after sign-in completes.
    pub fn signing_out_with(mut self, epoch: SessionEpoch) -> Self {
        self.sign_out_epoch = Some(epoch);
        self
    }

    pub fn fail_next_sign_in(&self, error: SignInError) {
        *self.next_failure.lock().expect("Lock poisoned") = Some(error);
    }

    pub fn sign_in_tokens(&self) -> Vec<String> {
        self.sign_in_tokens.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl PlatformAuth for MockPlatform {
    async fn sign_in(&self, token: &PlatformToken) -> Result<PlatformSession, SignInError> {
        self.sign_in_tokens
            .lock()
            .expect("Lock poisoned")
            .push(token.as_str().to_string());
        if let Some(error) = self.next_failure.lock().expect("Lock poisoned").take() {
            return Err(error);
        }

        let session = PlatformSession::new(format!("uid-{}", token.as_str()), Utc::now());
        *self.session.lock().expect("Lock poisoned") = Some(session.clone());
        if let Some(epoch) = &self.sign_out_epoch {
            epoch.advance();
        }
        Ok(session)
    }

    async fn current_session(&self) -> Option<PlatformSession> {
        self.session.lock().expect("Lock poisoned").clone()
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().expect("Lock poisoned") = None;
    }
}

/// Callback recording every outcome it receives.
#[derive(Default)]
pub struct RecordingCallback {
    pub successes: AtomicUsize,
    failures: Mutex<Vec<LoginErrorKind>>,
}

impl RecordingCallback {
    pub fn failures(&self) -> Vec<LoginErrorKind> {
        self.failures.lock().expect("Lock poisoned").clone()
    }
}

impl LoginCallback for RecordingCallback {
    fn on_success(&self, _session: &PlatformSession) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_fail(&self, error: &LoginError) {
        self.failures
            .lock()
            .expect("Lock poisoned")
            .push(error.kind());
    }
}

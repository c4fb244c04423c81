//! Complete login use case
//!
//! Runs provider login, token exchange and platform sign-in in order,
//! stopping at the first failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokenbridge_domain::{AttemptId, LoginError, LoginOutcome, PlatformSession};
use tokio::sync::watch;
use tracing::{Instrument, debug, info, info_span, warn};

use super::SignOut;
use crate::auth::{AttemptGuard, LoginState, SessionEpoch};
use crate::ports::{PlatformAuth, ProviderLogin, TokenExchange};

/// Receives the single outcome of a login attempt.
///
/// Exactly one of the two methods is called per attempt.
pub trait LoginCallback: Send + Sync {
    /// The attempt succeeded.
    fn on_success(&self, session: &PlatformSession);

    /// The attempt failed. `error.is_silent()` tells whether to show a dialog.
    fn on_fail(&self, error: &LoginError);
}

/// Publishes `Cancelled` when an attempt is dropped before it reached a
/// terminal state, e.g. a caller aborting through `select!` or a timeout.
struct AbandonedAttempt<'a> {
    state: &'a watch::Sender<LoginState>,
}

impl Drop for AbandonedAttempt<'_> {
    fn drop(&mut self) {
        let abandoned = self.state.send_if_modified(|state| {
            if state.is_in_progress() {
                *state = LoginState::Cancelled;
                true
            } else {
                false
            }
        });
        if abandoned {
            info!("login attempt abandoned before completion");
        }
    }
}

/// Use case for logging in through a third-party provider.
///
/// # Example
///
/// ```ignore
/// let login = CompleteLogin::new(provider, exchange, platform);
/// let session = login.execute().await?;
/// ```
pub struct CompleteLogin<P: ?Sized, X: ?Sized, A: ?Sized> {
    provider: Arc<P>,
    exchange: Arc<X>,
    platform: Arc<A>,
    in_flight: Arc<AtomicBool>,
    epoch: SessionEpoch,
    state: watch::Sender<LoginState>,
}

impl<P, X, A> CompleteLogin<P, X, A>
where
    P: ProviderLogin + ?Sized,
    X: TokenExchange + ?Sized,
    A: PlatformAuth + ?Sized,
{
    /// Creates the use case from its three collaborators.
    pub fn new(provider: Arc<P>, exchange: Arc<X>, platform: Arc<A>) -> Self {
        let (state, _) = watch::channel(LoginState::Idle);
        Self {
            provider,
            exchange,
            platform,
            in_flight: Arc::new(AtomicBool::new(false)),
            epoch: SessionEpoch::new(),
            state,
        }
    }

    /// Shares an existing sign-out epoch.
    #[must_use]
    pub fn with_epoch(mut self, epoch: SessionEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    /// The sign-out epoch watched by this use case.
    pub const fn epoch(&self) -> &SessionEpoch {
        &self.epoch
    }

    /// Returns true while an attempt is pending. A UI should disable its
    /// login trigger while this holds.
    pub fn is_in_progress(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Current login state.
    pub fn state(&self) -> LoginState {
        self.state.borrow().clone()
    }

    /// Subscribes to login state changes.
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Builds the matching sign-out use case, sharing collaborators and
    /// epoch.
    pub fn sign_out(&self) -> SignOut<P, A> {
        SignOut::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.platform),
            self.epoch.clone(),
        )
    }

    /// Runs one login attempt.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the chain, `LoginError::AlreadyInProgress`
    /// if another attempt is pending, or `LoginError::Superseded` if a
    /// sign-out happened after the provider step.
    pub async fn execute(&self) -> Result<PlatformSession, LoginError> {
        let Some(_guard) = AttemptGuard::acquire(&self.in_flight) else {
            warn!("login attempt rejected: another attempt is pending");
            return Err(LoginError::AlreadyInProgress);
        };
        // Dropped before the guard, so the state settles first.
        let _abandoned = AbandonedAttempt { state: &self.state };

        let attempt = AttemptId::new();
        let span = info_span!("login", %attempt, provider = %self.provider.kind());
        self.run().instrument(span).await
    }

    /// Runs one login attempt and reports it to `callback`.
    ///
    /// # Errors
    ///
    /// Same as [`CompleteLogin::execute`].
    pub async fn execute_with_callback<C>(
        &self,
        callback: &C,
    ) -> Result<PlatformSession, LoginError>
    where
        C: LoginCallback + ?Sized,
    {
        let result = self.execute().await;
        match &result {
            Ok(session) => callback.on_success(session),
            Err(error) => callback.on_fail(error),
        }
        result
    }

    async fn run(&self) -> Result<PlatformSession, LoginError> {
        self.set_state(LoginState::AwaitingProvider);
        let credential = match self.provider.login().await {
            LoginOutcome::Success(credential) => credential,
            LoginOutcome::Cancelled => return Err(self.fail(LoginError::Cancelled)),
            LoginOutcome::Failed(failure) => {
                return Err(self.fail(LoginError::ProviderFailed(failure)));
            }
        };
        let expected_uid = credential.expected_platform_uid();
        debug!(
            token = %credential.preview(),
            expected_uid = expected_uid.as_deref().unwrap_or("-"),
            "provider login succeeded"
        );

        // Sign-outs before this point belong to the previous session.
        let epoch = self.epoch.current();

        self.set_state(LoginState::Exchanging);
        let token = self
            .exchange
            .exchange_credential(&credential)
            .await
            .map_err(|e| self.fail(e.into()))?;
        debug!(token = %token.preview(), "received platform token");

        if self.epoch.current() != epoch {
            return Err(self.fail(LoginError::Superseded));
        }

        self.set_state(LoginState::SigningIn);
        let session = self
            .platform
            .sign_in(&token)
            .await
            .map_err(|e| self.fail(e.into()))?;

        if self.epoch.current() != epoch {
            warn!(uid = %session.uid, "sign-out raced the login attempt, discarding session");
            self.platform.sign_out().await;
            return Err(self.fail(LoginError::Superseded));
        }

        if let Some(expected) = expected_uid.filter(|uid| *uid != session.uid) {
            warn!(%expected, uid = %session.uid, "platform uid differs from provider user id");
        }
        info!(uid = %session.uid, "signed in");
        self.set_state(LoginState::SignedIn {
            uid: session.uid.clone(),
        });
        Ok(session)
    }

    fn fail(&self, error: LoginError) -> LoginError {
        if matches!(error, LoginError::Cancelled) {
            info!("provider login cancelled");
            self.set_state(LoginState::Cancelled);
        } else {
            warn!(kind = %error.kind(), %error, "login failed");
            self.set_state(LoginState::Failed { kind: error.kind() });
        }
        error
    }

    fn set_state(&self, state: LoginState) {
        debug!(state = ?state, "login state changed");
        self.state.send_replace(state);
    }
}

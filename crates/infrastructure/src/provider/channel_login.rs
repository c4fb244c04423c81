//! Provider login driven by an external UI.
//!
//! `ChannelProviderLogin` hands a `LoginResultSender` to whoever runs the
//! provider's login screen and suspends until that sender is completed.
//! Dropping the sender without completing it counts as a cancellation.

use async_trait::async_trait;
use tokenbridge_application::ProviderLogin;
use tokenbridge_domain::{LoginOutcome, ProviderCredential, ProviderFailure, ProviderKind};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Creates a channel-backed provider adapter and the receiver the UI
/// side reads login requests from.
#[must_use]
pub fn channel_login(
    kind: ProviderKind,
    buffer: usize,
) -> (ChannelProviderLogin, mpsc::Receiver<LoginResultSender>) {
    let (requests, receiver) = mpsc::channel(buffer.max(1));
    (ChannelProviderLogin { kind, requests }, receiver)
}

/// Provider adapter that waits for the UI to deliver a result.
#[derive(Debug, Clone)]
pub struct ChannelProviderLogin {
    kind: ProviderKind,
    requests: mpsc::Sender<LoginResultSender>,
}

/// A pending login request. Complete it exactly once.
#[derive(Debug)]
pub struct LoginResultSender {
    kind: ProviderKind,
    result: oneshot::Sender<LoginOutcome>,
}

impl LoginResultSender {
    /// The provider the login was requested for.
    #[must_use]
    pub const fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    /// Delivers the outcome. Returns false if the attempt no longer waits.
    pub fn complete(self, outcome: LoginOutcome) -> bool {
        let delivered = self.result.send(outcome).is_ok();
        if !delivered {
            debug!(provider = %self.kind, "login result arrived after the attempt ended");
        }
        delivered
    }

    /// Completes the login with the provider's access token.
    pub fn succeed(self, access_token: impl Into<String>) -> bool {
        let credential = ProviderCredential::new(self.kind.clone(), access_token);
        self.succeed_with(credential)
    }

    /// Completes the login with a full credential, e.g. one carrying the
    /// provider user id or OAuth Echo headers.
    pub fn succeed_with(self, credential: ProviderCredential) -> bool {
        if credential.kind() != &self.kind {
            warn!(
                requested = %self.kind,
                delivered = %credential.kind(),
                "login completed with another provider's credential"
            );
        }
        self.complete(LoginOutcome::Success(credential))
    }

    /// Reports that the user backed out.
    pub fn cancel(self) -> bool {
        self.complete(LoginOutcome::Cancelled)
    }

    /// Reports a provider SDK failure.
    pub fn fail(self, failure: ProviderFailure) -> bool {
        self.complete(LoginOutcome::Failed(failure))
    }
}

#[async_trait]
impl ProviderLogin for ChannelProviderLogin {
    fn kind(&self) -> ProviderKind {
        self.kind.clone()
    }

    async fn login(&self) -> LoginOutcome {
        let (result, outcome) = oneshot::channel();
        let request = LoginResultSender {
            kind: self.kind.clone(),
            result,
        };

        if self.requests.send(request).await.is_err() {
            warn!(provider = %self.kind, "login UI is gone");
            return LoginOutcome::Failed(ProviderFailure::new("login UI is not available"));
        }

        outcome.await.unwrap_or_else(|_| {
            debug!(provider = %self.kind, "login request dropped without a result");
            LoginOutcome::Cancelled
        })
    }
}

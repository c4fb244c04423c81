//! Provider login with a preconfigured outcome.

use async_trait::async_trait;
use tokenbridge_application::ProviderLogin;
use tokenbridge_domain::{LoginOutcome, ProviderCredential, ProviderKind};
use tracing::debug;

/// Provider adapter that yields the same outcome on every login.
///
/// Used when the provider token is obtained out of band, e.g. passed on
/// the command line.
#[derive(Debug, Clone)]
pub struct StaticProviderLogin {
    kind: ProviderKind,
    outcome: LoginOutcome,
}

impl StaticProviderLogin {
    /// Always succeeds with `credential`.
    #[must_use]
    pub fn new(credential: ProviderCredential) -> Self {
        Self {
            kind: credential.kind().clone(),
            outcome: LoginOutcome::Success(credential),
        }
    }

    /// Always reports a user cancellation.
    #[must_use]
    pub const fn cancelled(kind: ProviderKind) -> Self {
        Self {
            kind,
            outcome: LoginOutcome::Cancelled,
        }
    }
}

#[async_trait]
impl ProviderLogin for StaticProviderLogin {
    fn kind(&self) -> ProviderKind {
        self.kind.clone()
    }

    async fn login(&self) -> LoginOutcome {
        debug!(provider = %self.kind, "using preconfigured provider outcome");
        self.outcome.clone()
    }
}

//! Provider login port

use async_trait::async_trait;
use tokenbridge_domain::{LoginOutcome, ProviderFailure, ProviderKind};

/// Port for a third-party provider's login interaction.
///
/// Implementations drive the provider SDK's native login UI and may
/// suspend until the UI result is delivered back.
#[async_trait]
pub trait ProviderLogin: Send + Sync {
    /// The provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Runs the provider login.
    ///
    /// Cancellation by the user is reported as `LoginOutcome::Cancelled`,
    /// distinct from `LoginOutcome::Failed`.
    async fn login(&self) -> LoginOutcome;

    /// Logs out of the provider.
    ///
    /// # Errors
    /// Returns the provider's failure. The default does nothing.
    async fn logout(&self) -> Result<(), ProviderFailure> {
        Ok(())
    }
}

//! Sign-out use case

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::SessionEpoch;
use crate::ports::{PlatformAuth, ProviderLogin};

/// Signs out of the platform, then out of the provider.
///
/// Advancing the shared epoch first makes any login attempt still in
/// flight discard its result.
pub struct SignOut<P: ?Sized, A: ?Sized> {
    provider: Arc<P>,
    platform: Arc<A>,
    epoch: SessionEpoch,
}

impl<P, A> SignOut<P, A>
where
    P: ProviderLogin + ?Sized,
    A: PlatformAuth + ?Sized,
{
    /// Creates a new `SignOut` use case.
    pub const fn new(provider: Arc<P>, platform: Arc<A>, epoch: SessionEpoch) -> Self {
        Self {
            provider,
            platform,
            epoch,
        }
    }

    /// Executes the use case.
    ///
    /// A provider logout failure is logged; the platform session stays
    /// cleared regardless.
    pub async fn execute(&self) {
        let epoch = self.epoch.advance();
        self.platform.sign_out().await;

        if let Err(error) = self.provider.logout().await {
            warn!(provider = %self.provider.kind(), %error, "provider logout failed");
        }
        info!(epoch, "signed out");
    }
}

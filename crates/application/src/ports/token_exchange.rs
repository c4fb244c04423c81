//! Token exchange port

use async_trait::async_trait;
use tokenbridge_domain::{ExchangeError, PlatformToken, ProviderCredential};

/// Port for the trusted verification endpoint.
///
/// One call performs exactly one request and never retries.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchanges a provider access token for a platform custom token.
    ///
    /// # Errors
    /// - `ExchangeError::Network` on transport failure or timeout
    /// - `ExchangeError::ServerRejected` on a non-2xx status
    /// - `ExchangeError::MalformedResponse` when a 2xx body has no token
    async fn exchange(&self, provider_token: &str) -> Result<PlatformToken, ExchangeError>;

    /// Exchanges a full provider credential.
    ///
    /// Endpoints that need more than the access token (OAuth Echo
    /// headers) override this. The default forwards the access token to
    /// [`TokenExchange::exchange`].
    ///
    /// # Errors
    /// Same as [`TokenExchange::exchange`].
    async fn exchange_credential(
        &self,
        credential: &ProviderCredential,
    ) -> Result<PlatformToken, ExchangeError> {
        self.exchange(credential.access_token()).await
    }
}

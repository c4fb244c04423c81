//! Token exchange client implementation using reqwest.
//!
//! This adapter implements the `TokenExchange` port by posting the
//! provider credential to the verification endpoint. Redirects are never
//! followed: the credential only ever goes to the configured URL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use tokenbridge_application::{ApplicationError, ApplicationResult, TokenExchange};
use tokenbridge_domain::{
    ExchangeError, ExchangeErrorBody, ExchangeMode, ExchangeRequest, ExchangeResponse,
    ExchangeSettings, OAuthEchoHeaders, PlatformToken, ProviderCredential, token_preview,
};
use tracing::{debug, warn};

use super::{BodyError, MAX_BODY_BYTES, read_limited};

/// Exchange client using reqwest.
///
/// Performs exactly one POST per exchange with a bounded timeout.
/// It never retries and holds no session state.
pub struct ReqwestExchangeClient {
    client: Client,
    url: Url,
    timeout: Duration,
    mode: ExchangeMode,
}

impl ReqwestExchangeClient {
    /// Creates a client from validated exchange settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the HTTP client
    /// cannot be created.
    pub fn new(settings: &ExchangeSettings) -> ApplicationResult<Self> {
        settings.validate()?;

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ApplicationError::Initialization(e.to_string()))?;

        Ok(Self {
            client,
            url: settings.verification_url()?,
            timeout: settings.timeout(),
            mode: settings.mode,
        })
    }

    /// Creates a JSON-mode client around an existing reqwest client.
    ///
    /// The caller owns the redirect policy of `client`.
    #[must_use]
    pub const fn with_client(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
            mode: ExchangeMode::Json,
        }
    }

    /// Switches the request and response shape.
    #[must_use]
    pub const fn with_mode(mut self, mode: ExchangeMode) -> Self {
        self.mode = mode;
        self
    }

    /// The verification endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Maps reqwest errors to `ExchangeError`.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> ExchangeError {
        if error.is_builder() {
            return ExchangeError::InvalidRequest(error.to_string());
        }

        if error.is_timeout() {
            return ExchangeError::Network(format!(
                "request timed out after {}ms",
                timeout.as_millis()
            ));
        }

        if error.is_connect() {
            return ExchangeError::Network(format!("connection failed: {error}"));
        }

        ExchangeError::Network(error.to_string())
    }

    async fn post_json(&self, provider_token: &str) -> Result<PlatformToken, ExchangeError> {
        if provider_token.trim().is_empty() {
            return Err(ExchangeError::InvalidRequest(
                "provider token is empty".to_string(),
            ));
        }

        debug!(
            url = %self.url,
            token = %token_preview(provider_token),
            "exchanging provider token"
        );
        let request = self
            .client
            .post(self.url.clone())
            .json(&ExchangeRequest::new(provider_token));
        let body = self.send(request).await?;

        ExchangeResponse::parse(&body).inspect_err(|e| {
            warn!(error = %e, "exchange endpoint returned an unusable body");
        })
    }

    async fn post_oauth_echo(
        &self,
        headers: &OAuthEchoHeaders,
    ) -> Result<PlatformToken, ExchangeError> {
        if headers.service_provider().trim().is_empty() || headers.authorization().trim().is_empty()
        {
            return Err(ExchangeError::InvalidRequest(
                "OAuth Echo headers are empty".to_string(),
            ));
        }

        debug!(
            url = %self.url,
            service_provider = headers.service_provider(),
            "exchanging OAuth Echo credentials"
        );
        let request = self
            .client
            .post(self.url.clone())
            .header(
                OAuthEchoHeaders::SERVICE_PROVIDER_HEADER,
                headers.service_provider(),
            )
            .header(OAuthEchoHeaders::AUTHORIZATION_HEADER, headers.authorization());
        let body = self.send(request).await?;

        ExchangeResponse::parse_text(&body).inspect_err(|e| {
            warn!(error = %e, "exchange endpoint returned an unusable body");
        })
    }

    /// Sends the request and returns a 2xx body.
    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ExchangeError> {
        let start = Instant::now();

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout))?;

        let status = response.status();
        let body = match read_limited(response, MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(BodyError::Transport(e)) => return Err(Self::map_error(&e, self.timeout)),
            Err(BodyError::TooLarge { limit }) if status.is_success() => {
                return Err(ExchangeError::MalformedResponse(format!(
                    "response body exceeds {limit} bytes"
                )));
            }
            Err(BodyError::TooLarge { .. }) => Vec::new(),
        };

        debug!(
            status = status.as_u16(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "exchange endpoint responded"
        );

        if !status.is_success() {
            let message = ExchangeErrorBody::describe(status.as_u16(), &body);
            warn!(status = status.as_u16(), %message, "exchange endpoint rejected token");
            return Err(ExchangeError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl TokenExchange for ReqwestExchangeClient {
    async fn exchange(&self, provider_token: &str) -> Result<PlatformToken, ExchangeError> {
        match self.mode {
            ExchangeMode::Json => self.post_json(provider_token).await,
            ExchangeMode::OauthEcho => Err(ExchangeError::InvalidRequest(
                "OAuth Echo exchange needs the signed echo headers".to_string(),
            )),
        }
    }

    async fn exchange_credential(
        &self,
        credential: &ProviderCredential,
    ) -> Result<PlatformToken, ExchangeError> {
        match (self.mode, credential.oauth_echo()) {
            (ExchangeMode::Json, _) => self.post_json(credential.access_token()).await,
            (ExchangeMode::OauthEcho, Some(headers)) => self.post_oauth_echo(headers).await,
            (ExchangeMode::OauthEcho, None) => Err(ExchangeError::InvalidRequest(format!(
                "{} credential carries no OAuth Echo headers",
                credential.kind()
            ))),
        }
    }
}

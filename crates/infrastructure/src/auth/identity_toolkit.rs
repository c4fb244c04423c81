//! Identity Toolkit platform adapter.
//!
//! Signs in with a custom token through the Firebase Auth REST API and
//! keeps the resulting session as the current user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokenbridge_application::{ApplicationError, ApplicationResult, Clock, PlatformAuth};
use tokenbridge_domain::{PlatformSession, PlatformSettings, PlatformToken, SignInError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::claims::{decode_unverified, string_claim};
use crate::adapters::{BodyError, MAX_BODY_BYTES, SystemClock, read_limited};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    token: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    local_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Platform adapter backed by the Identity Toolkit REST API.
pub struct IdentityToolkitAuth {
    client: Client,
    url: Url,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    session: RwLock<Option<PlatformSession>>,
}

impl IdentityToolkitAuth {
    /// Creates the adapter from platform settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, the endpoint is
    /// invalid, or the HTTP client cannot be created.
    pub fn new(settings: &PlatformSettings, timeout: Duration) -> ApplicationResult<Self> {
        let url = settings.sign_in_url()?;
        let client = Client::builder()
            .user_agent(concat!("tokenbridge/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ApplicationError::Initialization(e.to_string()))?;

        Ok(Self::with_client(client, url, timeout))
    }

    /// Creates the adapter around an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
            clock: Arc::new(SystemClock::new()),
            session: RwLock::new(None),
        }
    }

    /// Uses the given clock to stamp sessions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn map_error(&self, error: &reqwest::Error) -> SignInError {
        if error.is_timeout() {
            return SignInError::Network(format!(
                "request timed out after {}ms",
                self.timeout.as_millis()
            ));
        }
        SignInError::Network(error.to_string())
    }

    fn rejection(status: u16, body: &[u8]) -> SignInError {
        let message = serde_json::from_slice::<ErrorEnvelope>(body)
            .map_or_else(|_| format!("HTTP {status}"), |envelope| envelope.error.message);
        SignInError::Rejected(message)
    }

    fn session_from(&self, response: SignInResponse) -> Result<PlatformSession, SignInError> {
        if response.id_token.is_empty() {
            return Err(SignInError::MalformedResponse("empty idToken".to_string()));
        }

        let claims = decode_unverified(&response.id_token).unwrap_or_default();
        let uid = response
            .local_id
            .filter(|id| !id.is_empty())
            .or_else(|| string_claim(&claims, "user_id").map(str::to_string))
            .or_else(|| string_claim(&claims, "sub").map(str::to_string))
            .ok_or_else(|| SignInError::MalformedResponse("no uid in response".to_string()))?;

        let expires_in = match response.expires_in.as_deref() {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                SignInError::MalformedResponse(format!("expiresIn is not a number: {raw}"))
            })?),
            None => None,
        };

        let mut session = PlatformSession::new(uid, self.clock.now()).with_tokens(
            response.id_token.clone(),
            response.refresh_token,
            expires_in,
        );
        if let Some(name) = string_claim(&claims, "name") {
            session = session.with_display_name(name);
        }
        session.photo_url = string_claim(&claims, "picture").map(str::to_string);
        session.provider_id = claims
            .get("firebase")
            .and_then(|f| f.get("sign_in_provider"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Ok(session)
    }
}

#[async_trait]
impl PlatformAuth for IdentityToolkitAuth {
    async fn sign_in(&self, token: &PlatformToken) -> Result<PlatformSession, SignInError> {
        if token.is_empty() {
            return Err(SignInError::InvalidToken("custom token is empty".to_string()));
        }

        debug!(token = %token.preview(), "signing in with custom token");

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&SignInRequest {
                token: token.as_str(),
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;

        let status = response.status();
        let body = match read_limited(response, MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(BodyError::Transport(e)) => return Err(self.map_error(&e)),
            Err(BodyError::TooLarge { limit }) if status.is_success() => {
                return Err(SignInError::MalformedResponse(format!(
                    "response body exceeds {limit} bytes"
                )));
            }
            Err(BodyError::TooLarge { .. }) => Vec::new(),
        };

        if !status.is_success() {
            let error = Self::rejection(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %error, "custom token sign-in rejected");
            return Err(error);
        }

        let parsed: SignInResponse = serde_json::from_slice(&body)
            .map_err(|e| SignInError::MalformedResponse(e.to_string()))?;
        let session = self.session_from(parsed)?;

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

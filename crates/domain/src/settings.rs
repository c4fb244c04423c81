//! Settings Domain Model
//!
//! Configuration for the exchange endpoint, the identity platform and the
//! provider. Loading is done by the infrastructure layer; this module only
//! defines the shape, the defaults and validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::ProviderKind;
use crate::error::{DomainError, DomainResult};

/// Default path of the verification endpoint.
pub const DEFAULT_VERIFY_PATH: &str = "/verifyToken";

/// Default timeout for the exchange call.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default Identity Toolkit base URL.
pub const DEFAULT_IDENTITY_TOOLKIT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Custom-token sign-in path on the Identity Toolkit API.
const SIGN_IN_WITH_CUSTOM_TOKEN_PATH: &str = "/v1/accounts:signInWithCustomToken";

/// Root settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Exchange endpoint settings.
    pub exchange: ExchangeSettings,
    /// Identity platform settings.
    pub platform: PlatformSettings,
    /// Provider settings.
    pub provider: ProviderSettings,
}

impl Settings {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> DomainResult<()> {
        self.exchange.validate()?;
        self.platform.validate()?;
        Ok(())
    }
}

/// Exchange endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// Base URL of the verification server, e.g. `https://linelogindemo.appspot.com`.
    pub verification_domain: String,
    /// Path of the verify endpoint.
    pub verify_path: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent sent with the exchange request.
    pub user_agent: String,
    /// How the provider credential is presented to the endpoint.
    pub mode: ExchangeMode,
}

/// Request and response shape of the verification endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeMode {
    /// POST `{"token": ...}`, answer `{"firebase_token": ...}` (LINE, Kakao).
    #[default]
    Json,
    /// POST the OAuth Echo headers, answer the token as plain text (Digits).
    OauthEcho,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            verification_domain: String::new(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: concat!("tokenbridge/", env!("CARGO_PKG_VERSION")).to_string(),
            mode: ExchangeMode::Json,
        }
    }
}

impl ExchangeSettings {
    /// Creates settings for the given verification domain.
    #[must_use]
    pub fn new(verification_domain: impl Into<String>) -> Self {
        Self {
            verification_domain: verification_domain.into(),
            ..Self::default()
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the exchange mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ExchangeMode) -> Self {
        self.mode = mode;
        self
    }

    /// The request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full URL of the verify endpoint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the domain and path do not form an
    /// http(s) URL.
    pub fn verification_url(&self) -> DomainResult<Url> {
        let raw = format!(
            "{}{}",
            self.verification_domain.trim().trim_end_matches('/'),
            self.verify_path
        );
        let url = Url::parse(&raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
        require_http(&url)?;
        Ok(url)
    }

    /// Validates the exchange settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty domain, a non-http(s) URL, a path
    /// without a leading `/`, or a zero timeout.
    pub fn validate(&self) -> DomainResult<()> {
        if self.verification_domain.trim().is_empty() {
            return Err(DomainError::MissingSetting(
                "exchange.verification_domain".to_string(),
            ));
        }
        if !self.verify_path.starts_with('/') {
            return Err(DomainError::InvalidSetting {
                name: "exchange.verify_path".to_string(),
                reason: "must start with '/'".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidSetting {
                name: "exchange.timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.verification_url().map(|_| ())
    }
}

/// Identity platform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Web API key of the platform project. Without it, sessions are
    /// kept in memory only.
    pub api_key: Option<String>,
    /// Identity Toolkit base URL.
    pub endpoint: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_IDENTITY_TOOLKIT_ENDPOINT.to_string(),
        }
    }
}

impl PlatformSettings {
    /// URL of the custom-token sign-in call, including the API key.
    ///
    /// # Errors
    ///
    /// Returns `MissingSetting` without an API key and `InvalidUrl` for
    /// a bad endpoint.
    pub fn sign_in_url(&self) -> DomainResult<Url> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DomainError::MissingSetting("platform.api_key".to_string()))?;

        let raw = format!(
            "{}{SIGN_IN_WITH_CUSTOM_TOKEN_PATH}",
            self.endpoint.trim().trim_end_matches('/')
        );
        let mut url =
            Url::parse(&raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))?;
        require_http(&url)?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    /// Validates the platform settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty API key or an invalid endpoint.
    pub fn validate(&self) -> DomainResult<()> {
        if self.api_key.is_none() {
            return Ok(());
        }
        self.sign_in_url().map(|_| ())
    }
}

/// Provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProviderSettings {
    /// Which provider issued the tokens.
    pub kind: ProviderKind,
}

fn require_http(url: &Url) -> DomainResult<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(DomainError::InvalidUrl(format!(
            "unsupported scheme '{other}' in {url}"
        ))),
    }
}

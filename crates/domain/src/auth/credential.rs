//! Provider credential types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of leading characters kept by [`token_preview`].
const PREVIEW_CHARS: usize = 8;

/// Returns a log-safe preview of a token (first 8 chars + `...`).
///
/// Tokens of 12 characters or fewer are fully masked.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}

/// Third-party identity provider that issued a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProviderKind {
    /// LINE Login.
    Line,
    /// Twitter Digits phone login.
    Digits,
    /// Kakao Login.
    Kakao,
    /// Any other provider, identified by name.
    Custom(String),
}

impl ProviderKind {
    /// Returns the lowercase provider name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Line => "line",
            Self::Digits => "digits",
            Self::Kakao => "kakao",
            Self::Custom(name) => name,
        }
    }

    /// Namespaces a provider-assigned user id the way verification
    /// servers build platform uids (`line:<mid>`, `kakao:<id>`).
    #[must_use]
    pub fn platform_uid(&self, provider_user_id: &str) -> String {
        format!("{}:{provider_user_id}", self.as_str())
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Custom("custom".to_string())
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "" => Err("provider name must not be empty".to_string()),
            "line" => Ok(Self::Line),
            "digits" | "twitter" => Ok(Self::Digits),
            "kakao" => Ok(Self::Kakao),
            _ => Ok(Self::Custom(name)),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Access token issued by a provider after a successful login.
///
/// This is never a platform-trusted identity. It is only ever forwarded
/// to the exchange endpoint, which verifies it with the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    kind: ProviderKind,
    access_token: String,
    user_id: Option<String>,
    oauth_echo: Option<OAuthEchoHeaders>,
}

impl ProviderCredential {
    /// Creates a credential from a provider access token.
    #[must_use]
    pub fn new(kind: ProviderKind, access_token: impl Into<String>) -> Self {
        Self {
            kind,
            access_token: access_token.into(),
            user_id: None,
            oauth_echo: None,
        }
    }

    /// Attaches the provider-assigned user id.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attaches OAuth Echo headers for verification servers that check
    /// the credential with the provider themselves (Digits).
    #[must_use]
    pub fn with_oauth_echo(mut self, headers: OAuthEchoHeaders) -> Self {
        self.oauth_echo = Some(headers);
        self
    }

    /// The provider that issued this credential.
    #[must_use]
    pub const fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    /// The raw access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The provider-assigned user id, if the provider reported one.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// OAuth Echo headers, if the provider signed some.
    #[must_use]
    pub const fn oauth_echo(&self) -> Option<&OAuthEchoHeaders> {
        self.oauth_echo.as_ref()
    }

    /// Platform uid the exchange endpoint is expected to assign, when the
    /// provider reported its user id.
    #[must_use]
    pub fn expected_platform_uid(&self) -> Option<String> {
        self.user_id.as_deref().map(|id| self.kind.platform_uid(id))
    }

    /// Log-safe preview of the access token.
    #[must_use]
    pub fn preview(&self) -> String {
        token_preview(&self.access_token)
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("kind", &self.kind)
            .field("access_token", &self.preview())
            .field("user_id", &self.user_id)
            .field("oauth_echo", &self.oauth_echo)
            .finish()
    }
}

/// OAuth Echo header pair.
///
/// The provider signs a verify-credentials request on the client; the
/// exchange endpoint replays it against `service_provider` to learn who
/// the user is.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthEchoHeaders {
    service_provider: String,
    authorization: String,
}

impl OAuthEchoHeaders {
    /// Header naming the provider URL that verifies the credentials.
    pub const SERVICE_PROVIDER_HEADER: &'static str = "X-Auth-Service-Provider";

    /// Header carrying the signed `OAuth ...` authorization.
    pub const AUTHORIZATION_HEADER: &'static str = "X-Verify-Credentials-Authorization";

    /// Creates the header pair.
    #[must_use]
    pub fn new(service_provider: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            service_provider: service_provider.into(),
            authorization: authorization.into(),
        }
    }

    /// Verify-credentials URL of the provider.
    #[must_use]
    pub fn service_provider(&self) -> &str {
        &self.service_provider
    }

    /// Signed authorization header value.
    #[must_use]
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl fmt::Debug for OAuthEchoHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthEchoHeaders")
            .field("service_provider", &self.service_provider)
            .field("authorization", &token_preview(&self.authorization))
            .finish()
    }
}

//! Platform session types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::auth::token_preview;

/// Signed-in identity platform session.
///
/// Owned by the platform adapter; the login flow only reads it.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSession {
    /// Platform user id (e.g. `line:U1234`).
    pub uid: String,
    /// Provider that backed the custom token, if known.
    pub provider_id: Option<String>,
    /// Display name from the platform profile.
    pub display_name: Option<String>,
    /// Profile photo URL.
    pub photo_url: Option<String>,
    /// Platform ID token.
    #[serde(skip_serializing)]
    pub id_token: Option<String>,
    /// Platform refresh token.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// When the ID token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the sign-in completed.
    pub signed_in_at: DateTime<Utc>,
}

impl PlatformSession {
    /// Creates a session with only a uid.
    #[must_use]
    pub fn new(uid: impl Into<String>, signed_in_at: DateTime<Utc>) -> Self {
        Self {
            uid: uid.into(),
            provider_id: None,
            display_name: None,
            photo_url: None,
            id_token: None,
            refresh_token: None,
            expires_at: None,
            signed_in_at,
        }
    }

    /// Sets the provider id.
    #[must_use]
    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the platform tokens and their expiry.
    #[must_use]
    pub fn with_tokens(
        mut self,
        id_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        self.id_token = Some(id_token.into());
        self.refresh_token = refresh_token;
        self.expires_at =
            expires_in_secs.map(|secs| self.signed_in_at + chrono::Duration::seconds(secs));
        self
    }
}

impl fmt::Debug for PlatformSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSession")
            .field("uid", &self.uid)
            .field("provider_id", &self.provider_id)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("id_token", &self.id_token.as_deref().map(token_preview))
            .field("expires_at", &self.expires_at)
            .field("signed_in_at", &self.signed_in_at)
            .finish_non_exhaustive()
    }
}

/// Platform custom-token sign-in errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInError {
    /// The custom token was refused locally (empty, undecodable).
    #[error("invalid custom token: {0}")]
    InvalidToken(String),

    /// The platform refused the token (expired, wrong audience).
    #[error("platform rejected sign-in: {0}")]
    Rejected(String),

    /// Transport failure talking to the platform.
    #[error("platform network error: {0}")]
    Network(String),

    /// The platform answered without a usable session.
    #[error("malformed platform response: {0}")]
    MalformedResponse(String),
}

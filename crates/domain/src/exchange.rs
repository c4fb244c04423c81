//! Token exchange wire types
//!
//! The exchange endpoint accepts `{"token": "<provider token>"}` and
//! answers `{"firebase_token": "<custom token>"}`. OAuth Echo endpoints
//! answer with the custom token as plain text instead.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::token_preview;

/// Longest error message kept from a raw response body.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Body of the exchange POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    /// Provider access token to verify.
    pub token: String,
}

impl ExchangeRequest {
    /// Creates a request for the given provider token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Successful exchange response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    /// The platform custom-auth token.
    #[serde(alias = "platform_token")]
    pub firebase_token: String,
}

impl ExchangeResponse {
    /// Parses a 2xx response body into a platform token.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if the body is not JSON, lacks a
    /// string `firebase_token`, or the token is empty.
    pub fn parse(body: &[u8]) -> Result<PlatformToken, ExchangeError> {
        let response: Self = serde_json::from_slice(body)
            .map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

        if response.firebase_token.is_empty() {
            return Err(ExchangeError::MalformedResponse(
                "firebase_token is empty".to_string(),
            ));
        }

        Ok(PlatformToken::new(response.firebase_token))
    }

    /// Parses a plain-text 2xx body whose first line is the token.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if the body is not UTF-8 or the first
    /// line is blank.
    pub fn parse_text(body: &[u8]) -> Result<PlatformToken, ExchangeError> {
        let text = std::str::from_utf8(body)
            .map_err(|e| ExchangeError::MalformedResponse(format!("body is not UTF-8: {e}")))?;

        let token = text.lines().next().unwrap_or_default().trim();
        if token.is_empty() {
            return Err(ExchangeError::MalformedResponse(
                "response body is empty".to_string(),
            ));
        }

        Ok(PlatformToken::new(token))
    }
}

/// Error body returned by verification servers.
///
/// Servers disagree on the field name: `error_message`, `error` or
/// `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeErrorBody {
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ExchangeErrorBody {
    /// Best-effort message from the parsed body.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        if let Some(message) = &self.error_message {
            return Some(message.clone());
        }
        match &self.error {
            Some(serde_json::Value::String(s)) => return Some(s.clone()),
            Some(serde_json::Value::Object(obj)) => {
                if let Some(serde_json::Value::String(s)) = obj.get("message") {
                    return Some(s.clone());
                }
            }
            _ => {}
        }
        self.message.clone()
    }

    /// Describes an error response for logs, falling back to the raw
    /// body text or the status code.
    #[must_use]
    pub fn describe(status: u16, body: &[u8]) -> String {
        if let Ok(parsed) = serde_json::from_slice::<Self>(body)
            && let Some(message) = parsed.message()
        {
            return message;
        }

        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        if text.is_empty() {
            format!("HTTP {status}")
        } else {
            text.chars().take(MAX_ERROR_BODY_CHARS).collect()
        }
    }
}

/// Platform custom-auth token minted by the exchange endpoint.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PlatformToken(String);

impl PlatformToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns true if the token is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Log-safe preview.
    #[must_use]
    pub fn preview(&self) -> String {
        token_preview(&self.0)
    }
}

impl fmt::Debug for PlatformToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlatformToken").field(&self.preview()).finish()
    }
}

/// Token exchange errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The request was refused before any I/O.
    #[error("invalid exchange request: {0}")]
    InvalidRequest(String),

    /// Transport failure or timeout.
    #[error("exchange network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status.
    #[error("exchange rejected with HTTP {status}: {message}")]
    ServerRejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// 2xx response without a usable token.
    #[error("malformed exchange response: {0}")]
    MalformedResponse(String),
}

//! Login outcome and error taxonomy

use std::fmt;

use thiserror::Error;

use super::credential::ProviderCredential;
use crate::exchange::ExchangeError;
use crate::session::SignInError;

/// Failure reported by a provider SDK (network, SDK internal error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderFailure {
    /// Human readable cause.
    pub message: String,
    /// Provider-specific error code, when the SDK exposes one.
    pub code: Option<String>,
}

impl ProviderFailure {
    /// Creates a failure with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a provider error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Result of the provider login interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The user logged in and the provider issued an access token.
    Success(ProviderCredential),
    /// The user dismissed the provider login UI.
    Cancelled,
    /// The provider SDK failed.
    Failed(ProviderFailure),
}

/// Coarse error classification used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginErrorKind {
    /// User aborted the provider login.
    LoginCancelled,
    /// Provider SDK reported a failure.
    LoginFailed,
    /// Exchange request was refused before being sent.
    ExchangeInvalidRequest,
    /// Exchange endpoint unreachable or timed out.
    ExchangeNetworkError,
    /// Exchange endpoint answered with a non-2xx status.
    ExchangeServerRejected,
    /// Exchange endpoint answered 2xx without a usable token.
    ExchangeMalformedResponse,
    /// Platform custom-token sign-in failed.
    PlatformSignInFailed,
    /// Another attempt was still pending.
    LoginInProgress,
    /// The user signed out while the attempt was in flight.
    LoginSuperseded,
}

impl LoginErrorKind {
    /// Stable identifier for structured logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoginCancelled => "login_cancelled",
            Self::LoginFailed => "login_failed",
            Self::ExchangeInvalidRequest => "exchange_invalid_request",
            Self::ExchangeNetworkError => "exchange_network_error",
            Self::ExchangeServerRejected => "exchange_server_rejected",
            Self::ExchangeMalformedResponse => "exchange_malformed_response",
            Self::PlatformSignInFailed => "platform_sign_in_failed",
            Self::LoginInProgress => "login_in_progress",
            Self::LoginSuperseded => "login_superseded",
        }
    }
}

impl fmt::Display for LoginErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a login attempt. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// The user cancelled the provider login.
    #[error("login cancelled by user")]
    Cancelled,

    /// The provider login failed.
    #[error("provider login failed: {0}")]
    ProviderFailed(#[source] ProviderFailure),

    /// The token exchange failed.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// The platform sign-in failed.
    #[error(transparent)]
    SignIn(#[from] SignInError),

    /// A previous attempt has not resolved yet.
    #[error("a login attempt is already in progress")]
    AlreadyInProgress,

    /// The session was signed out while this attempt was in flight.
    #[error("login superseded by sign-out")]
    Superseded,
}

impl LoginError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> LoginErrorKind {
        match self {
            Self::Cancelled => LoginErrorKind::LoginCancelled,
            Self::ProviderFailed(_) => LoginErrorKind::LoginFailed,
            Self::Exchange(ExchangeError::InvalidRequest(_)) => {
                LoginErrorKind::ExchangeInvalidRequest
            }
            Self::Exchange(ExchangeError::Network(_)) => LoginErrorKind::ExchangeNetworkError,
            Self::Exchange(ExchangeError::ServerRejected { .. }) => {
                LoginErrorKind::ExchangeServerRejected
            }
            Self::Exchange(ExchangeError::MalformedResponse(_)) => {
                LoginErrorKind::ExchangeMalformedResponse
            }
            Self::SignIn(_) => LoginErrorKind::PlatformSignInFailed,
            Self::AlreadyInProgress => LoginErrorKind::LoginInProgress,
            Self::Superseded => LoginErrorKind::LoginSuperseded,
        }
    }

    /// Returns true when a UI should not show an error dialog.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Superseded)
    }
}

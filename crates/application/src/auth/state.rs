//! Login state for tracking an attempt through its three steps.

use tokenbridge_domain::LoginErrorKind;

/// State of the current (or last) login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginState {
    /// No attempt has run yet.
    #[default]
    Idle,
    /// Waiting for the user in the provider's login UI.
    AwaitingProvider,
    /// Exchanging the provider token for a platform token.
    Exchanging,
    /// Signing in to the platform with the custom token.
    SigningIn,
    /// Attempt completed successfully.
    SignedIn {
        /// Platform uid of the new session.
        uid: String,
    },
    /// Attempt failed.
    Failed {
        /// Classification of the failure.
        kind: LoginErrorKind,
    },
    /// User cancelled the provider login.
    Cancelled,
}

impl LoginState {
    /// Check if an attempt is in progress.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::AwaitingProvider | Self::Exchanging | Self::SigningIn
        )
    }

    /// Check if the attempt finished (success or failure).
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::SignedIn { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }

    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(&self) -> &str {
        match self {
            Self::Idle => "Ready to log in",
            Self::AwaitingProvider => "Waiting for provider login...",
            Self::Exchanging => "Verifying provider token...",
            Self::SigningIn => "Signing in...",
            Self::SignedIn { .. } => "Signed in",
            Self::Failed { .. } => "Login failed",
            Self::Cancelled => "Login cancelled",
        }
    }
}

//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A setting has a value outside its accepted range.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        /// Dotted setting name, e.g. `exchange.timeout_ms`.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required setting is missing or empty.
    #[error("missing setting: {0}")]
    MissingSetting(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

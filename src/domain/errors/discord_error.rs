//! Discord session error types.

use thiserror::Error;

/// Errors raised while talking to the Discord API.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DiscordError {
    #[error("invalid token format: {reason}")]
    InvalidTokenFormat { reason: String },

    #[error("token rejected by Discord: {message}")]
    TokenRejected { message: String },

    #[error("network error talking to Discord: {message}")]
    NetworkError { message: String },

    #[error("rate limited by Discord, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("session is closed")]
    SessionClosed,

    #[error("unexpected Discord API error: {message}")]
    Unexpected { message: String },
}

impl DiscordError {
    /// Creates invalid format error.
    #[must_use]
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidTokenFormat {
            reason: reason.into(),
        }
    }

    /// Creates token rejected error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::TokenRejected {
            message: message.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}

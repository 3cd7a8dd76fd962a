use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to a star directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Authentication required or the credential was rejected.
    #[error("Authentication required")]
    Auth,

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// Transient network or server-side failure, safe to retry.
    #[error("Transient error: {message}")]
    Transient { message: String },

    /// Resource not found (user, repo, page).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Non-retryable API error from the directory.
    #[error("API error: {message}")]
    Api { message: String },

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DirectoryError {
    /// Create a transient error.
    #[inline]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an API error.
    #[inline]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is worth retrying at the directory boundary.
    ///
    /// Rate limits and transient network failures are retryable; auth,
    /// not-found and plain API errors are not.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transient { .. })
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which is useful for errors
/// that include backtraces or multi-line details.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

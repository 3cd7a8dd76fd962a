//! Mapping from octocrab errors to the directory error taxonomy.

use chrono::{Duration, Utc};

use crate::directory::DirectoryError;

/// Default rate-limit backoff horizon when GitHub does not tell us
/// when the window resets.
const RATE_LIMIT_FALLBACK_SECS: i64 = 60;

/// Build a rate-limited error with the fallback reset horizon.
pub(crate) fn rate_limited() -> DirectoryError {
    DirectoryError::RateLimited {
        reset_at: Utc::now() + Duration::seconds(RATE_LIMIT_FALLBACK_SECS),
    }
}

/// Classify an HTTP status from a raw GitHub response.
///
/// `None` means the status is not an error for the caller's purposes.
pub(crate) fn error_for_status(status: u16, context: &str) -> Option<DirectoryError> {
    match status {
        200..=299 | 304 => None,
        401 => Some(DirectoryError::Auth),
        403 | 429 => Some(rate_limited()),
        404 => Some(DirectoryError::not_found(context.to_string())),
        500..=599 => Some(DirectoryError::transient(format!(
            "GitHub returned status {status} for {context}"
        ))),
        _ => Some(DirectoryError::api(format!(
            "Unexpected status {status} for {context}"
        ))),
    }
}

/// Convert a transport-level octocrab error.
pub(crate) fn map_octocrab_error(e: octocrab::Error) -> DirectoryError {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            match status {
                401 => DirectoryError::Auth,
                403 | 429 => rate_limited(),
                404 => DirectoryError::not_found(source.message.clone()),
                500..=599 => DirectoryError::transient(source.message.clone()),
                _ => DirectoryError::api(source.message.clone()),
            }
        }
        // Empty or truncated response bodies usually mean a secondary
        // rate limit rather than a real decoding problem.
        octocrab::Error::Json { source, .. } => DirectoryError::transient(source.to_string()),
        other => DirectoryError::transient(other.to_string()),
    }
}

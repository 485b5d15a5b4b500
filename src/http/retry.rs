//! Classification of HTTP failures into retryable and permanent ones.

use reqwest::StatusCode;
use thiserror::Error;

/// Maximum number of attempts for a network operation.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// HTTP failures that will not go away by asking again.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NonRetryableError {
    #[error("rate limit exceeded ({0}); try again later or set GITHUB_TOKEN")]
    RateLimitExceeded(String),

    #[error("authentication failed ({0}); check GITHUB_TOKEN")]
    AuthenticationFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("access forbidden: {0}")]
    Forbidden(String),

    #[error("request rejected with HTTP {0}")]
    ClientError(u16),
}

/// Returns `Ok(())` when `error` is worth retrying (transport failures, 5xx),
/// or the permanent failure it represents.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let Some(status) = error.status() else {
        return Ok(());
    };
    let url = error.url().map(|u| u.to_string()).unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed(url)),
        StatusCode::FORBIDDEN if error.to_string().contains("rate limit") => {
            Err(NonRetryableError::RateLimitExceeded(url))
        }
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden(url)),
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::RateLimitExceeded(url)),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(url)),
        s if s.is_client_error() => Err(NonRetryableError::ClientError(s.as_u16())),
        _ => Ok(()),
    }
}

/// Wraps an `error_for_status()` failure so that permanent failures can be
/// recognized by downcasting to [`NonRetryableError`].
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(permanent) => anyhow::Error::from(permanent),
    }
}

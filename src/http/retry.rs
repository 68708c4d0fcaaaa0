//! Retry policy for index requests and error classification.

use reqwest::StatusCode;

/// Maximum number of attempts for a single index request.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// Too many requests (HTTP 429)
    RateLimitExceeded(String),
    /// Resource not found (HTTP 404)
    NotFound(String),
    /// Other 4xx client errors
    ClientError(String),
    /// The server answered, but the body could not be decoded
    InvalidResponse(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(msg) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", msg)
            }
            NonRetryableError::NotFound(msg) => write!(f, "Not found: {}", msg),
            NonRetryableError::ClientError(msg) => write!(f, "Request error: {}", msg),
            NonRetryableError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for NonRetryableError {}

impl NonRetryableError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NonRetryableError::NotFound(_))
    }
}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    if let Some(status) = error.status() {
        match status {
            StatusCode::NOT_FOUND => {
                return Err(NonRetryableError::NotFound(
                    "The requested resource was not found".to_string(),
                ));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(NonRetryableError::RateLimitExceeded(
                    "Too many requests".to_string(),
                ));
            }
            s if s.is_client_error() => {
                return Err(NonRetryableError::ClientError(format!(
                    "HTTP {} error",
                    s.as_u16()
                )));
            }
            // 5xx
            _ => {}
        }
    }

    // Connection errors, timeouts, etc.
    Ok(())
}

/// Maps an error from `error_for_status()` to either the original (retryable)
/// error or a [`NonRetryableError`].
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}

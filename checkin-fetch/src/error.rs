//! Fetch error types.

use thiserror::Error;

use crate::retry::Retryable;

/// Error type for HTTP fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a throttling or server-side status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Beginning of the response body.
        body: String,
    },

    /// Response body does not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON encoding/decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Host is not in the client's allowlist.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::InvalidResponse(_)
            | FetchError::Json(_)
            | FetchError::InvalidUrl(_)
            | FetchError::DomainNotAllowed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let throttled = FetchError::Status { status: 429, body: String::new() };
        let server = FetchError::Status { status: 503, body: String::new() };
        let client = FetchError::Status { status: 404, body: String::new() };

        assert!(throttled.is_retryable());
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
    }

    #[test]
    fn test_malformed_response_is_terminal() {
        assert!(!FetchError::InvalidResponse("missing result".into()).is_retryable());
        assert!(!FetchError::DomainNotAllowed("evil.example".into()).is_retryable());
    }
}

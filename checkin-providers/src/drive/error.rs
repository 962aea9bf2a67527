//! Drive API errors.

use checkin_fetch::{FetchError, Retryable};
use thiserror::Error;

/// Errors raised by the drive API client.
///
/// Business failures reported by the provider are not errors; they come back
/// as [`CallOutcome::Failed`](super::CallOutcome::Failed).
#[derive(Debug, Error)]
pub enum DriveError {
    /// Transport or decoding failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Response decoded but lacks the fields the step needs.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Retryable for DriveError {
    fn is_retryable(&self) -> bool {
        match self {
            DriveError::Fetch(e) => e.is_retryable(),
            DriveError::InvalidResponse(_) => false,
        }
    }
}

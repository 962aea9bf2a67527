//! Aliyun Drive member API.
//!
//! Four calls make up a check-in: refresh the token pair, check in, claim
//! the day's reward and list the day's task. Each call runs inside its own
//! retry envelope and classifies the answer into a [`CallOutcome`].

mod api;
mod error;
pub mod parser;

pub use api::{DriveClient, DriveEndpoints, ALLOWED_DOMAIN};
pub use error::DriveError;

use async_trait::async_trait;
use checkin_core::CredentialPair;

// ============================================================================
// Call Outcome
// ============================================================================

/// Classified answer of one drive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// The provider accepted the call.
    Success(T),
    /// The provider refused the call; carries its message.
    Failed(String),
    /// The refresh token is expired or invalid. Retrying cannot help.
    Expired(String),
}

impl<T> CallOutcome<T> {
    /// Returns true for [`CallOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Result of a successful token refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedSession {
    /// The rotated pair. The old refresh token is now invalid.
    pub credentials: CredentialPair,
    /// Account display name.
    pub user_name: String,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckIn {
    /// Cumulative check-ins this month, today included.
    pub sign_in_count: u32,
}

/// Today's reward and task labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyTask {
    /// Label of the check-in reward.
    pub reward: String,
    /// Task reminder with the task name in parentheses.
    pub task: String,
}

// ============================================================================
// Drive API Trait
// ============================================================================

/// The four drive operations a check-in needs.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Exchanges the refresh token for a new pair.
    async fn refresh_credential(
        &self,
        refresh_token: &str,
    ) -> Result<CallOutcome<RefreshedSession>, DriveError>;

    /// Performs today's check-in.
    async fn check_in(&self, access_token: &str) -> Result<CallOutcome<CheckIn>, DriveError>;

    /// Claims the reward for the given cumulative day.
    async fn claim_reward(
        &self,
        access_token: &str,
        sign_in_day: u32,
    ) -> Result<CallOutcome<()>, DriveError>;

    /// Looks up today's reward and task labels.
    async fn fetch_task(&self, access_token: &str) -> Result<CallOutcome<DailyTask>, DriveError>;
}

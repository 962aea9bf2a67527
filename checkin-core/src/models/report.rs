//! Run summary and the report handed to the notifier.

use serde::{Deserialize, Serialize};

/// Everything a fully successful check-in collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInSummary {
    /// Display name of the account.
    pub user_name: String,
    /// Cumulative check-ins in the current month.
    pub sign_in_count: u32,
    /// Label of today's check-in reward.
    pub reward: String,
    /// Today's bonus task, reminder plus name.
    pub task: String,
}

/// Outcome of one run, reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunReport {
    /// Every step succeeded.
    Success(SignInSummary),
    /// A step failed; `message` carries the step prefix.
    Failure {
        /// Display name if the refresh step got far enough to learn it.
        user_name: String,
        /// Step-prefixed error message.
        message: String,
    },
}

impl RunReport {
    /// Creates a failure report.
    pub fn failure(user_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            user_name: user_name.into(),
            message: message.into(),
        }
    }

    /// Returns true for a successful run.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the display name carried by the report.
    pub fn user_name(&self) -> &str {
        match self {
            Self::Success(summary) => &summary.user_name,
            Self::Failure { user_name, .. } => user_name,
        }
    }
}

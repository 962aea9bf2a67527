//! Check-in workflow.
//!
//! The run is a fixed chain:
//!
//! ```text
//! RefreshingCredential → CheckingIn → ClaimingReward → FetchingTask → ReportingSuccess
//!          └──────────────┴──────────────┴──────────────┴──→ ReportingFailure
//! ```
//!
//! A stage advances only when its call succeeds. The first failure skips
//! every remaining call and produces one failure report carrying the stage's
//! step name. Either way exactly one report is sent and the credential pair
//! held at that moment is persisted once, after all network activity.

use checkin_core::{CredentialPair, RunReport, SignInSummary};
use checkin_store::{CredentialStore, StoreError};
use std::fmt;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::drive::{CallOutcome, DriveApi, DriveError};
use crate::notify::Notifier;

// ============================================================================
// Stage
// ============================================================================

/// A network stage of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Exchanging the refresh token for a new pair.
    RefreshingCredential,
    /// Performing the daily check-in.
    CheckingIn,
    /// Claiming the reward for today's count.
    ClaimingReward,
    /// Looking up today's reward and task labels.
    FetchingTask,
}

impl Stage {
    /// Step name used as the failure message prefix.
    pub fn step_name(self) -> &'static str {
        match self {
            Stage::RefreshingCredential => "get_access_token",
            Stage::CheckingIn => "sign_in",
            Stage::ClaimingReward => "get_reward",
            Stage::FetchingTask => "get_task",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step_name())
    }
}

// ============================================================================
// Step Failure
// ============================================================================

/// Why the chain stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Stage whose call failed.
    pub stage: Stage,
    /// Provider message or error description.
    pub detail: String,
    /// True when the refresh token itself is no longer usable.
    pub credential_expired: bool,
}

impl StepFailure {
    /// Message sent in the failure report, e.g. `sign_in error: <detail>`.
    pub fn message(&self) -> String {
        format!("{} error: {}", self.stage, self.detail)
    }
}

/// Unwraps a successful outcome or converts anything else into a failure.
fn advance<T>(stage: Stage, result: Result<CallOutcome<T>, DriveError>) -> Result<T, StepFailure> {
    let (detail, credential_expired) = match result {
        Ok(CallOutcome::Success(value)) => {
            info!(stage = %stage, "Stage completed");
            return Ok(value);
        }
        Ok(CallOutcome::Failed(message)) => (message, false),
        Ok(CallOutcome::Expired(message)) => (message, true),
        Err(e) => (e.to_string(), false),
    };

    Err(StepFailure {
        stage,
        detail,
        credential_expired,
    })
}

// ============================================================================
// Run Outcome
// ============================================================================

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The report that was sent.
    pub report: RunReport,
    /// The pair held at the end of the run; the one to persist.
    pub credentials: CredentialPair,
    /// Set when the chain stopped early.
    pub failure: Option<StepFailure>,
}

impl RunOutcome {
    /// Returns true if every stage succeeded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

// ============================================================================
// Workflow
// ============================================================================

/// Orchestrates one check-in run.
pub struct SignInWorkflow<'a> {
    api: &'a dyn DriveApi,
    notifier: &'a dyn Notifier,
}

/// State carried between stages.
struct Session {
    credentials: CredentialPair,
    user_name: String,
}

impl<'a> SignInWorkflow<'a> {
    /// Creates a workflow over the given API and notifier.
    pub fn new(api: &'a dyn DriveApi, notifier: &'a dyn Notifier) -> Self {
        Self { api, notifier }
    }

    /// Runs the chain and sends exactly one report. Does not persist.
    #[instrument(skip_all)]
    pub async fn run(&self, credentials: CredentialPair) -> RunOutcome {
        let start = Instant::now();
        let mut session = Session {
            credentials,
            user_name: String::new(),
        };

        let (report, failure) = match self.run_chain(&mut session).await {
            Ok(summary) => {
                info!(
                    user = %summary.user_name,
                    sign_in_count = summary.sign_in_count,
                    elapsed = ?start.elapsed(),
                    "Check-in completed"
                );
                (RunReport::Success(summary), None)
            }
            Err(failure) => {
                if failure.credential_expired {
                    error!(
                        detail = %failure.detail,
                        "Refresh token rejected; a new one must be supplied"
                    );
                } else {
                    error!(stage = %failure.stage, detail = %failure.detail, "Check-in failed");
                }
                (
                    RunReport::failure(session.user_name.clone(), failure.message()),
                    Some(failure),
                )
            }
        };

        self.notifier.report(&report).await;

        RunOutcome {
            report,
            credentials: session.credentials,
            failure,
        }
    }

    /// Runs the chain, reports, then saves the held pair exactly once.
    ///
    /// The save happens on both paths. Its error is the only one returned;
    /// every step failure has already been reported.
    pub async fn run_and_persist(
        &self,
        store: &dyn CredentialStore,
        credentials: CredentialPair,
    ) -> Result<RunOutcome, StoreError> {
        let outcome = self.run(credentials).await;

        if let Err(e) = store.save(&outcome.credentials).await {
            warn!(error = %e, "Failed to persist credentials");
            return Err(e);
        }

        Ok(outcome)
    }

    async fn run_chain(&self, session: &mut Session) -> Result<SignInSummary, StepFailure> {
        let refreshed = advance(
            Stage::RefreshingCredential,
            self.api
                .refresh_credential(&session.credentials.refresh_token)
                .await,
        )?;
        // The old refresh token is dead from here on; hold the new pair at once.
        session.credentials = refreshed.credentials;
        session.user_name = refreshed.user_name;

        let access_token = session.credentials.access_token.clone();

        let check_in = advance(Stage::CheckingIn, self.api.check_in(&access_token).await)?;

        advance(
            Stage::ClaimingReward,
            self.api
                .claim_reward(&access_token, check_in.sign_in_count)
                .await,
        )?;

        let task = advance(Stage::FetchingTask, self.api.fetch_task(&access_token).await)?;

        Ok(SignInSummary {
            user_name: session.user_name.clone(),
            sign_in_count: check_in.sign_in_count,
            reward: task.reward,
            task: task.task,
        })
    }
}

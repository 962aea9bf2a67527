//! Integration tests for the check-in workflow.
//!
//! The drive API, notifier and credential store are replaced by in-memory
//! fakes that record every call.

use async_trait::async_trait;
use checkin_core::{CredentialPair, RunReport, SignInSummary};
use checkin_fetch::FetchError;
use checkin_providers::{
    CallOutcome, CheckIn, DailyTask, DriveApi, DriveError, Notifier, RefreshedSession,
    SignInWorkflow, Stage,
};
use checkin_store::{CredentialStore, StoreError};
use std::sync::Mutex;

// ============================================================================
// Fakes
// ============================================================================

/// Scripted answer for one fake call.
#[derive(Clone)]
enum Script<T> {
    Ok(T),
    Fail(&'static str),
    Expire(&'static str),
    Malformed(&'static str),
}

impl<T: Clone> Script<T> {
    fn play(&self) -> Result<CallOutcome<T>, DriveError> {
        match self {
            Script::Ok(value) => Ok(CallOutcome::Success(value.clone())),
            Script::Fail(message) => Ok(CallOutcome::Failed((*message).to_string())),
            Script::Expire(message) => Ok(CallOutcome::Expired((*message).to_string())),
            Script::Malformed(detail) => Err(DriveError::Fetch(FetchError::InvalidResponse(
                (*detail).to_string(),
            ))),
        }
    }
}

struct FakeDrive {
    refresh: Script<RefreshedSession>,
    check_in: Script<CheckIn>,
    reward: Script<()>,
    task: Script<DailyTask>,
    calls: Mutex<Vec<String>>,
}

impl FakeDrive {
    /// Every call succeeds: alice, day 5.
    fn happy() -> Self {
        Self {
            refresh: Script::Ok(RefreshedSession {
                credentials: CredentialPair::new("new-access", "new-refresh"),
                user_name: "alice".to_string(),
            }),
            check_in: Script::Ok(CheckIn { sign_in_count: 5 }),
            reward: Script::Ok(()),
            task: Script::Ok(DailyTask {
                reward: "5-day bonus".to_string(),
                task: "watch ad (bonus space)".to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DriveApi for FakeDrive {
    async fn refresh_credential(
        &self,
        refresh_token: &str,
    ) -> Result<CallOutcome<RefreshedSession>, DriveError> {
        self.record(format!("refresh:{refresh_token}"));
        self.refresh.play()
    }

    async fn check_in(&self, access_token: &str) -> Result<CallOutcome<CheckIn>, DriveError> {
        self.record(format!("check_in:{access_token}"));
        self.check_in.play()
    }

    async fn claim_reward(
        &self,
        access_token: &str,
        sign_in_day: u32,
    ) -> Result<CallOutcome<()>, DriveError> {
        self.record(format!("reward:{access_token}:{sign_in_day}"));
        self.reward.play()
    }

    async fn fetch_task(&self, access_token: &str) -> Result<CallOutcome<DailyTask>, DriveError> {
        self.record(format!("task:{access_token}"));
        self.task.play()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    reports: Mutex<Vec<RunReport>>,
}

impl RecordingNotifier {
    fn reports(&self) -> Vec<RunReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn report(&self, report: &RunReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<CredentialPair>>,
    fail_saves: bool,
}

impl MemoryStore {
    fn saved(&self) -> Vec<CredentialPair> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<CredentialPair, StoreError> {
        Ok(original())
    }

    async fn save(&self, credentials: &CredentialPair) -> Result<(), StoreError> {
        self.saved.lock().unwrap().push(credentials.clone());
        if self.fail_saves {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

fn original() -> CredentialPair {
    CredentialPair::new("old-access", "old-refresh")
}

fn rotated() -> CredentialPair {
    CredentialPair::new("new-access", "new-refresh")
}

fn failure_message(report: &RunReport) -> &str {
    match report {
        RunReport::Failure { message, .. } => message,
        RunReport::Success(_) => panic!("expected a failure report"),
    }
}

// ============================================================================
// Success Path
// ============================================================================

#[tokio::test]
async fn test_end_to_end_success() {
    let drive = FakeDrive::happy();
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    let outcome = SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(
        notifier.reports(),
        vec![RunReport::Success(SignInSummary {
            user_name: "alice".to_string(),
            sign_in_count: 5,
            reward: "5-day bonus".to_string(),
            task: "watch ad (bonus space)".to_string(),
        })]
    );
    assert_eq!(store.saved(), vec![rotated()]);
}

#[tokio::test]
async fn test_calls_use_rotated_access_token_and_count() {
    let drive = FakeDrive::happy();
    let notifier = RecordingNotifier::default();

    SignInWorkflow::new(&drive, &notifier).run(original()).await;

    assert_eq!(
        drive.calls(),
        vec![
            "refresh:old-refresh",
            "check_in:new-access",
            "reward:new-access:5",
            "task:new-access",
        ]
    );
}

// ============================================================================
// Failure Paths
// ============================================================================

#[tokio::test]
async fn test_check_in_failure_short_circuits() {
    let drive = FakeDrive {
        check_in: Script::Fail("access token is invalid"),
        ..FakeDrive::happy()
    };
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    let outcome = SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await
        .unwrap();

    assert_eq!(drive.calls(), vec!["refresh:old-refresh", "check_in:new-access"]);

    let reports = notifier.reports();
    assert_eq!(reports.len(), 1);
    assert!(failure_message(&reports[0]).starts_with("sign_in error:"));
    assert_eq!(
        failure_message(&reports[0]),
        "sign_in error: access token is invalid"
    );
    assert_eq!(reports[0].user_name(), "alice");

    assert_eq!(outcome.failure.unwrap().stage, Stage::CheckingIn);
    assert_eq!(store.saved(), vec![rotated()]);
}

#[tokio::test]
async fn test_expired_refresh_token_keeps_original_pair() {
    let drive = FakeDrive {
        refresh: Script::Expire("refresh token is expired"),
        ..FakeDrive::happy()
    };
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    let outcome = SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await
        .unwrap();

    assert_eq!(drive.calls(), vec!["refresh:old-refresh"]);
    assert_eq!(
        notifier.reports(),
        vec![RunReport::failure(
            "",
            "get_access_token error: refresh token is expired"
        )]
    );
    assert!(outcome.failure.unwrap().credential_expired);
    assert_eq!(store.saved(), vec![original()]);
}

#[tokio::test]
async fn test_reward_failure_skips_task() {
    let drive = FakeDrive {
        reward: Script::Fail("already claimed"),
        ..FakeDrive::happy()
    };
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await
        .unwrap();

    assert!(!drive.calls().iter().any(|c| c.starts_with("task:")));
    assert_eq!(
        failure_message(&notifier.reports()[0]),
        "get_reward error: already claimed"
    );
    assert_eq!(store.saved().len(), 1);
}

#[tokio::test]
async fn test_malformed_task_response_is_reported() {
    let drive = FakeDrive {
        task: Script::Malformed("task result has no signInInfos"),
        ..FakeDrive::happy()
    };
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    let outcome = SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(
        failure_message(&outcome.report),
        "get_task error: Invalid response: task result has no signInInfos"
    );
    assert_eq!(notifier.reports().len(), 1);
    assert_eq!(store.saved(), vec![rotated()]);
}

#[tokio::test]
async fn test_malformed_refresh_response_is_reported() {
    let drive = FakeDrive {
        refresh: Script::Malformed("token response has no access_token/refresh_token"),
        ..FakeDrive::happy()
    };
    let notifier = RecordingNotifier::default();
    let store = MemoryStore::default();

    SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await
        .unwrap();

    assert!(failure_message(&notifier.reports()[0]).starts_with("get_access_token error:"));
    assert_eq!(store.saved(), vec![original()]);
}

#[tokio::test]
async fn test_missing_tier_is_reported() {
    let drive = FakeDrive {
        task: Script::Fail("no sign-in tier found for day 5"),
        ..FakeDrive::happy()
    };
    let notifier = RecordingNotifier::default();

    let outcome = SignInWorkflow::new(&drive, &notifier).run(original()).await;

    assert_eq!(outcome.failure.as_ref().unwrap().stage, Stage::FetchingTask);
    assert_eq!(
        failure_message(&outcome.report),
        "get_task error: no sign-in tier found for day 5"
    );
    assert_eq!(outcome.credentials, rotated());
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_save_failure_is_returned_after_single_report() {
    let drive = FakeDrive::happy();
    let notifier = RecordingNotifier::default();
    let store = MemoryStore {
        fail_saves: true,
        ..MemoryStore::default()
    };

    let result = SignInWorkflow::new(&drive, &notifier)
        .run_and_persist(&store, original())
        .await;

    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(notifier.reports().len(), 1);
    assert_eq!(store.saved(), vec![rotated()]);
}

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Check-in Providers
//!
//! The remote side of a check-in run and the workflow that drives it.
//!
//! - [`drive`] - Aliyun Drive API client (refresh, check-in, reward, task)
//! - [`dingtalk`] - DingTalk robot notifier with signed requests
//! - [`notify`] - Notifier trait and the disabled fallback
//! - [`workflow`] - The check-in chain, its single report and credential write-back
//!
//! ## Usage
//!
//! ```ignore
//! use checkin_providers::{DriveClient, DisabledNotifier, SignInWorkflow};
//!
//! let api = DriveClient::from_config(&config)?;
//! let notifier = DisabledNotifier;
//! let workflow = SignInWorkflow::new(&api, &notifier);
//!
//! let outcome = workflow.run_and_persist(&store, credentials).await?;
//! ```

pub mod dingtalk;
pub mod drive;
pub mod notify;
pub mod workflow;

pub use dingtalk::{DingTalkNotifier, NotifyError};
pub use drive::{
    CallOutcome, CheckIn, DailyTask, DriveApi, DriveClient, DriveEndpoints, DriveError,
    RefreshedSession,
};
pub use notify::{DisabledNotifier, Notifier};
pub use workflow::{RunOutcome, SignInWorkflow, Stage, StepFailure};

use checkin_fetch::HttpClient;
use checkin_store::AppConfig;

/// Builds the notifier the configuration asks for.
///
/// Without a webhook target, or if the HTTP client cannot be built, the
/// disabled notifier is returned; notifications never stop a run.
pub fn notifier_from_config(config: &AppConfig) -> Box<dyn Notifier> {
    let Some(target) = config.webhook.clone() else {
        return Box::new(DisabledNotifier);
    };

    match HttpClient::with_timeout(config.request_timeout) {
        Ok(http) => Box::new(DingTalkNotifier::new(http, target)),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build webhook client, notifications disabled");
            Box::new(DisabledNotifier)
        }
    }
}

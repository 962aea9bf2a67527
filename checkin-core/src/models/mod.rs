//! Domain models for the check-in runner.
//!
//! - [`credential`] - Credential pair and webhook target
//! - [`report`] - Sign-in summary and run report

mod credential;
mod report;

pub use credential::{redact, redact_url, CredentialPair, WebhookTarget};
pub use report::{RunReport, SignInSummary};

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Check-in Core
//!
//! Core types shared by every crate of the drive check-in runner.
//!
//! ## Key Types
//!
//! - [`CredentialPair`] - Access/refresh token pair that rotates on refresh
//! - [`WebhookTarget`] - Where the outcome notification goes
//! - [`SignInSummary`] - What a fully successful run collected
//! - [`RunReport`] - The single report handed to the notifier

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{redact, redact_url, CredentialPair, RunReport, SignInSummary, WebhookTarget};

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Check-in Fetch
//!
//! Network plumbing for the check-in runner.
//!
//! - [`retry`] - Bounded-attempt, randomized-backoff envelope for one call
//! - [`client`] - JSON-over-HTTP client with a host allowlist and fixed timeout
//!
//! ## Example
//!
//! ```ignore
//! use checkin_fetch::{HttpClient, RetryPolicy};
//!
//! let http = HttpClient::new()?.with_allowed_domains(vec!["aliyundrive.com".into()]);
//! let policy = RetryPolicy::new(2);
//!
//! let response = policy
//!     .run("sign_in", || http.post_json(url, &[], Some(token), &body))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod retry;

pub use client::{HttpClient, JsonResponse, DEFAULT_TIMEOUT};
pub use error::FetchError;
pub use retry::{RetryPolicy, Retryable, StepPolicies};

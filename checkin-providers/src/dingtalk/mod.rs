//! DingTalk robot notifications.
//!
//! - [`signer`] - Request signature (timestamp + secret, HMAC-SHA256)
//! - [`message`] - Markdown rendering of a run report
//! - [`DingTalkNotifier`] - Delivery

pub mod message;
mod notifier;
pub mod signer;

pub use notifier::{DingTalkNotifier, NotifyError};

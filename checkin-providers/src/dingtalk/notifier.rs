//! DingTalk webhook delivery.

use async_trait::async_trait;
use checkin_core::{RunReport, WebhookTarget};
use checkin_fetch::{FetchError, HttpClient};
use chrono::{Local, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::message::{self, TITLE};
use super::signer;
use crate::notify::Notifier;

/// Reasons a notification was not delivered.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The webhook URL could not be signed.
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport or decoding failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The robot answered with an error.
    #[error("Webhook rejected the message: {0}")]
    Rejected(String),
}

/// Sends run reports to a DingTalk robot.
#[derive(Debug, Clone)]
pub struct DingTalkNotifier {
    http: HttpClient,
    target: WebhookTarget,
}

impl DingTalkNotifier {
    /// Creates a notifier for `target`.
    pub fn new(http: HttpClient, target: WebhookTarget) -> Self {
        Self { http, target }
    }

    /// Posts already rendered markdown. Single attempt.
    #[instrument(skip(self, text))]
    pub async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        let timestamp = Utc::now().timestamp_millis();
        let url = signer::signed_url(&self.target.url, &self.target.secret, timestamp)?;

        let body = json!({
            "msgtype": "markdown",
            "markdown": {"title": TITLE, "text": text},
        });

        let response = self.http.post_json(url.as_str(), &[], None, &body).await?;
        debug!(status = %response.status, body = %response.body, "Webhook response");

        if !response.status.is_success() {
            return Err(NotifyError::Rejected(format!("HTTP {}", response.status)));
        }

        let errcode = response.body["errcode"].as_i64().unwrap_or(0);
        if errcode != 0 {
            let errmsg = response.body["errmsg"].as_str().unwrap_or("unknown error");
            return Err(NotifyError::Rejected(format!("{errcode}: {errmsg}")));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for DingTalkNotifier {
    async fn report(&self, report: &RunReport) {
        let text = message::render(report, &Local::now());
        info!(success = report.is_success(), "Sending notification");
        debug!(%text, "Notification text");

        match self.deliver(&text).await {
            Ok(()) => info!("Notification delivered"),
            Err(e) => warn!(error = %e, "Notification not delivered"),
        }
    }
}

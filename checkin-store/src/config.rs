//! Configuration management.
//!
//! Everything the run needs from the environment is read here, once, into
//! an [`AppConfig`]. Components receive the value and never look at the
//! environment themselves.

use checkin_core::{redact, redact_url, WebhookTarget};
use checkin_fetch::{StepPolicies, DEFAULT_TIMEOUT};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Credential document used when no path is given.
pub const DEFAULT_CREDENTIALS_FILE: &str = "config.yaml";

/// Environment variable names.
pub mod env_keys {
    /// Access token fallback (container-mount pattern).
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Refresh token fallback (container-mount pattern).
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// DingTalk robot webhook URL.
    pub const WEBHOOK_URL: &str = "dingding_webhook_url";
    /// DingTalk robot signing secret.
    pub const WEBHOOK_SECRET: &str = "dingding_webhook_secret";
}

// ============================================================================
// Fallback Credentials
// ============================================================================

/// Tokens supplied through the environment.
///
/// Used only when the credential document lacks either token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FallbackCredentials {
    /// Access token from the environment.
    pub access_token: Option<String>,
    /// Refresh token from the environment.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for FallbackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCredentials")
            .field("access_token", &self.access_token.as_deref().map(redact))
            .field("refresh_token", &self.refresh_token.as_deref().map(redact))
            .finish()
    }
}

// ============================================================================
// App Config
// ============================================================================

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the credential document.
    pub credentials_path: PathBuf,
    /// Environment-provided tokens.
    pub fallback: FallbackCredentials,
    /// Notification target; `None` disables notifications.
    pub webhook: Option<WebhookTarget>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retry policy for each step.
    pub policies: StepPolicies,
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env(credentials_path: impl Into<PathBuf>) -> Self {
        Self::from_lookup(credentials_path, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(credentials_path: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fallback = FallbackCredentials {
            access_token: non_empty(env_keys::ACCESS_TOKEN),
            refresh_token: non_empty(env_keys::REFRESH_TOKEN),
        };

        let webhook = WebhookTarget::from_parts(
            non_empty(env_keys::WEBHOOK_URL),
            non_empty(env_keys::WEBHOOK_SECRET),
        );

        let config = Self {
            credentials_path: credentials_path.into(),
            fallback,
            webhook,
            request_timeout: DEFAULT_TIMEOUT,
            policies: StepPolicies::default(),
        };

        debug!(?config, "Configuration resolved");
        if config.webhook.is_none() {
            info!("No webhook configured, notifications disabled");
        }

        config
    }

    /// Replaces the per-step retry policies.
    pub fn with_policies(mut self, policies: StepPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Returns true if a webhook target is configured.
    pub fn notifications_enabled(&self) -> bool {
        self.webhook.is_some()
    }

    /// Returns a printable view with secrets redacted.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            credentials_path: self.credentials_path.display().to_string(),
            env_access_token: self.fallback.access_token.as_deref().map(redact),
            env_refresh_token: self.fallback.refresh_token.as_deref().map(redact),
            webhook_url: self.webhook.as_ref().map(|w| redact_url(&w.url)),
            webhook_secret: self.webhook.as_ref().map(|w| redact(&w.secret)),
            request_timeout_secs: self.request_timeout.as_secs(),
            max_attempts: self.policies.check_in.max_attempts,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(DEFAULT_CREDENTIALS_FILE, |_| None)
    }
}

/// Redacted view of [`AppConfig`] for display.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    /// Path of the credential document.
    pub credentials_path: String,
    /// Redacted access token from the environment.
    pub env_access_token: Option<String>,
    /// Redacted refresh token from the environment.
    pub env_refresh_token: Option<String>,
    /// Webhook URL with its query values redacted.
    pub webhook_url: Option<String>,
    /// Redacted webhook secret.
    pub webhook_secret: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Attempt ceiling per step.
    pub max_attempts: u32,
}

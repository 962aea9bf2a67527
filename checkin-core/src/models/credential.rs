//! Credentials and notification targets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

// ============================================================================
// Credential Pair
// ============================================================================

/// Access/refresh token pair.
///
/// The refresh token is single-use: every successful refresh invalidates it
/// and hands back a new pair, so the latest pair must always be persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Short-lived bearer token used on every member request.
    pub access_token: String,
    /// Single-use token exchanged for a new pair.
    pub refresh_token: String,
}

impl CredentialPair {
    /// Creates a new credential pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns an error if the refresh token is empty.
    ///
    /// An empty access token is fine: the first step always refreshes it.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.refresh_token.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "refresh_token is empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Shortens a secret to its first and last four characters.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// Redacts every query value of a URL, keeping the keys.
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => format!("{key}={}", redact(value)),
            None => pair.to_string(),
        })
        .collect();
    format!("{base}?{}", pairs.join("&"))
}

// ============================================================================
// Webhook Target
// ============================================================================

/// Chat webhook endpoint and its signing secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTarget {
    /// Robot webhook URL, including its own access token query.
    pub url: String,
    /// Shared secret used to sign each request.
    pub secret: String,
}

impl WebhookTarget {
    /// Builds a target when both parts are present and non-empty.
    pub fn from_parts(url: Option<String>, secret: Option<String>) -> Option<Self> {
        let url = url.filter(|u| !u.trim().is_empty())?;
        let secret = secret.filter(|s| !s.trim().is_empty())?;
        Some(Self { url, secret })
    }
}

impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTarget")
            .field("url", &redact_url(&self.url))
            .field("secret", &redact(&self.secret))
            .finish()
    }
}

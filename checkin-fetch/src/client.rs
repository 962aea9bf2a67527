//! JSON-over-HTTP client with a fixed timeout and domain allowlist.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;

/// Per-request timeout used by every call of a run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// User agent string sent with every request.
const USER_AGENT: &str = concat!("drive-checkin/", env!("CARGO_PKG_VERSION"));

/// How much of an unexpected body is kept in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

// ============================================================================
// Response
// ============================================================================

/// Decoded JSON response.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Parsed body.
    pub body: serde_json::Value,
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client that posts JSON and decodes JSON.
///
/// Provider APIs report business errors inside JSON bodies that may come with
/// 4xx statuses, so only throttling and server errors are turned into
/// [`FetchError::Status`]; everything else is decoded and handed back.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a client with the default timeout and no domain restriction.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(FetchError::DomainNotAllowed(host.to_string()))
        }
    }

    /// POSTs a JSON body and decodes the JSON answer.
    ///
    /// `query` pairs are appended to any query already present in `url`.
    #[instrument(skip(self, query, bearer, body), fields(url = %url))]
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
        body: &B,
    ) -> Result<JsonResponse, FetchError> {
        self.is_domain_allowed(url)?;
        debug!(authenticated = bearer.is_some(), "POST request with JSON");

        let mut request = self.inner.post(url).json(body);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = %status, bytes = text.len(), "Response received");

        decode(status, &text)
    }
}

/// Turns a raw response into a [`JsonResponse`] or a classified error.
fn decode(status: StatusCode, text: &str) -> Result<JsonResponse, FetchError> {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: preview(text),
        });
    }

    let body = serde_json::from_str(text).map_err(|e| {
        FetchError::InvalidResponse(format!(
            "HTTP {status}: body is not JSON ({e}): {}",
            preview(text)
        ))
    })?;

    Ok(JsonResponse { status, body })
}

fn preview(text: &str) -> String {
    text.chars().take(BODY_PREVIEW_CHARS).collect()
}

// ============================================================================
// Tests
// ============================================================================

//! Aliyun Drive API client.

use async_trait::async_trait;
use checkin_fetch::{HttpClient, RetryPolicy, StepPolicies};
use checkin_store::AppConfig;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::parser;
use super::{CallOutcome, CheckIn, DailyTask, DriveApi, DriveError, RefreshedSession};

// ============================================================================
// Constants
// ============================================================================

/// Every endpoint lives under this domain.
pub const ALLOWED_DOMAIN: &str = "aliyundrive.com";

/// Token refresh endpoint.
const TOKEN_URL: &str = "https://auth.aliyundrive.com/v2/account/token";

/// Check-in endpoint.
const SIGN_IN_URL: &str = "https://member.aliyundrive.com/v1/activity/sign_in_list";

/// Reward claim endpoint.
const REWARD_URL: &str = "https://member.aliyundrive.com/v1/activity/sign_in_reward";

/// Reward calendar endpoint, used to find today's task.
const TASK_URL: &str = "https://member.aliyundrive.com/v2/activity/sign_in_list";

/// Query sent to the member endpoints.
const MEMBER_QUERY: &[(&str, &str)] = &[("_rx-s", "mobile")];

// ============================================================================
// Endpoints
// ============================================================================

/// Endpoint URLs used by [`DriveClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveEndpoints {
    /// Token refresh.
    pub token: String,
    /// Check-in.
    pub sign_in: String,
    /// Reward claim.
    pub reward: String,
    /// Reward calendar.
    pub task: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self {
            token: TOKEN_URL.to_string(),
            sign_in: SIGN_IN_URL.to_string(),
            reward: REWARD_URL.to_string(),
            task: TASK_URL.to_string(),
        }
    }
}

// ============================================================================
// API Client
// ============================================================================

/// Drive client: one retry envelope per operation.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: HttpClient,
    endpoints: DriveEndpoints,
    policies: StepPolicies,
}

impl DriveClient {
    /// Creates a client over an existing HTTP client.
    pub fn new(http: HttpClient, policies: StepPolicies) -> Self {
        Self {
            http,
            endpoints: DriveEndpoints::default(),
            policies,
        }
    }

    /// Creates the client described by the configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, DriveError> {
        let http = HttpClient::with_timeout(config.request_timeout)?
            .with_allowed_domains(vec![ALLOWED_DOMAIN.to_string()]);
        Ok(Self::new(http, config.policies.clone()))
    }

    /// Replaces the endpoint URLs.
    pub fn with_endpoints(mut self, endpoints: DriveEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Posts to a drive endpoint inside `policy`'s retry envelope.
    async fn call<T, P>(
        &self,
        policy: &RetryPolicy,
        label: &str,
        url: &str,
        bearer: Option<&str>,
        body: Value,
        parse: P,
    ) -> Result<CallOutcome<T>, DriveError>
    where
        P: Fn(Value) -> Result<CallOutcome<T>, DriveError>,
    {
        let http = &self.http;
        let query: &[(&str, &str)] = if bearer.is_some() { MEMBER_QUERY } else { &[] };
        let body = &body;
        let parse = &parse;

        policy
            .run(label, || async move {
                let response = http.post_json(url, query, bearer, body).await?;
                debug!(label, status = %response.status, "Drive response");
                parse(response.body)
            })
            .await
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    #[instrument(skip(self, refresh_token))]
    async fn refresh_credential(
        &self,
        refresh_token: &str,
    ) -> Result<CallOutcome<RefreshedSession>, DriveError> {
        let body = json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });

        self.call(
            &self.policies.refresh,
            "get_access_token",
            &self.endpoints.token,
            None,
            body,
            parser::parse_refresh,
        )
        .await
    }

    #[instrument(skip(self, access_token))]
    async fn check_in(&self, access_token: &str) -> Result<CallOutcome<CheckIn>, DriveError> {
        self.call(
            &self.policies.check_in,
            "sign_in",
            &self.endpoints.sign_in,
            Some(access_token),
            json!({"isReward": false}),
            parser::parse_check_in,
        )
        .await
    }

    #[instrument(skip(self, access_token))]
    async fn claim_reward(
        &self,
        access_token: &str,
        sign_in_day: u32,
    ) -> Result<CallOutcome<()>, DriveError> {
        self.call(
            &self.policies.reward,
            "get_reward",
            &self.endpoints.reward,
            Some(access_token),
            json!({"signInDay": sign_in_day}),
            parser::parse_reward,
        )
        .await
    }

    #[instrument(skip(self, access_token))]
    async fn fetch_task(&self, access_token: &str) -> Result<CallOutcome<DailyTask>, DriveError> {
        self.call(
            &self.policies.task,
            "get_task",
            &self.endpoints.task,
            Some(access_token),
            json!({}),
            parser::parse_task,
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

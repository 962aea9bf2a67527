//! Drive response parsing and classification.
//!
//! Every parser takes the decoded JSON body and returns either a classified
//! [`CallOutcome`] or [`DriveError::InvalidResponse`] when the body does not
//! have the shape the step needs.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CallOutcome, CheckIn, DailyTask, DriveError, RefreshedSession};
use checkin_core::CredentialPair;

/// Provider codes meaning the refresh token can no longer be used.
pub const EXPIRED_TOKEN_CODES: &[&str] = &["RefreshTokenExpired", "InvalidParameter.RefreshToken"];

/// Reward entry type carrying the check-in reward.
const REWARD_TYPE_SIGN_IN: &str = "dailySignIn";

/// Reward entry type carrying the daily task.
const REWARD_TYPE_TASK: &str = "dailyTask";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    nick_name: Option<String>,
}

/// Envelope shared by the member endpoints.
#[derive(Debug, Deserialize)]
struct MemberResponse<R> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    // `default` would require `R: Default`.
    result: Option<R>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResult {
    #[serde(default)]
    sign_in_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskListResult {
    #[serde(default)]
    sign_in_count: Option<u32>,
    #[serde(default)]
    sign_in_infos: Option<Vec<RewardTier>>,
}

/// One reward tier of the monthly calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardTier {
    /// Cumulative day the tier applies to; a number or a numeric string.
    #[serde(default)]
    pub day: Value,
    /// Rewards offered on that day.
    #[serde(default)]
    pub rewards: Vec<RewardEntry>,
}

impl RewardTier {
    /// Returns the tier's day as a number, if it is one.
    pub fn day_number(&self) -> Option<u32> {
        match &self.day {
            Value::Number(n) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One reward inside a tier.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardEntry {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Reminder text shown to the user.
    #[serde(default)]
    pub remind: Option<String>,
    /// Entry type, e.g. `dailySignIn` or `dailyTask`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

fn decode<T: DeserializeOwned>(body: Value, step: &str) -> Result<T, DriveError> {
    serde_json::from_value(body).map_err(|e| {
        warn!(step, error = %e, "Unexpected response shape");
        DriveError::InvalidResponse(format!("{step} response: {e}"))
    })
}

fn message_or(message: Option<String>, fallback: &str) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

// ============================================================================
// Parsers
// ============================================================================

/// Classifies a token refresh answer.
pub fn parse_refresh(body: Value) -> Result<CallOutcome<RefreshedSession>, DriveError> {
    let response: TokenResponse = decode(body, "token")?;

    if let Some(code) = response.code.as_deref() {
        if EXPIRED_TOKEN_CODES.contains(&code) {
            return Ok(CallOutcome::Expired(message_or(response.message, code)));
        }
    }

    let access = response.access_token.filter(|t| !t.is_empty());
    let refresh = response.refresh_token.filter(|t| !t.is_empty());

    match (access, refresh) {
        (Some(access), Some(refresh)) => {
            let user_name = response
                .user_name
                .filter(|n| !n.is_empty())
                .or(response.nick_name)
                .unwrap_or_default();
            debug!(user = %user_name, "Token refreshed");

            Ok(CallOutcome::Success(RefreshedSession {
                credentials: CredentialPair::new(access, refresh),
                user_name,
            }))
        }
        _ => match response.code {
            Some(code) => Ok(CallOutcome::Failed(message_or(response.message, &code))),
            None => Err(DriveError::InvalidResponse(
                "token response has no access_token/refresh_token".to_string(),
            )),
        },
    }
}

/// Classifies a check-in answer.
pub fn parse_check_in(body: Value) -> Result<CallOutcome<CheckIn>, DriveError> {
    let response: MemberResponse<SignInResult> = decode(body, "sign_in")?;

    match response.success {
        None => Ok(CallOutcome::Failed(message_or(
            response.message,
            "check-in response has no success flag",
        ))),
        Some(false) => Ok(CallOutcome::Failed(message_or(
            response.message,
            "check-in was not accepted",
        ))),
        Some(true) => {
            let sign_in_count = response
                .result
                .and_then(|r| r.sign_in_count)
                .ok_or_else(|| {
                    DriveError::InvalidResponse("check-in result has no signInCount".to_string())
                })?;
            Ok(CallOutcome::Success(CheckIn { sign_in_count }))
        }
    }
}

/// Classifies a reward claim answer.
pub fn parse_reward(body: Value) -> Result<CallOutcome<()>, DriveError> {
    let response: MemberResponse<Value> = decode(body, "reward")?;

    if response.result.is_none() {
        return Ok(CallOutcome::Failed(message_or(
            response.message,
            "reward response has no result",
        )));
    }

    if response.success == Some(true) {
        Ok(CallOutcome::Success(()))
    } else {
        Ok(CallOutcome::Failed(message_or(
            response.message,
            "reward claim was not accepted",
        )))
    }
}

/// Classifies a task listing answer and extracts today's labels.
pub fn parse_task(body: Value) -> Result<CallOutcome<DailyTask>, DriveError> {
    let response: MemberResponse<TaskListResult> = decode(body, "task")?;

    let Some(result) = response.result else {
        return Ok(CallOutcome::Failed(message_or(
            response.message,
            "task response has no result",
        )));
    };

    if response.success != Some(true) {
        return Ok(CallOutcome::Failed(message_or(
            response.message,
            "task listing was not accepted",
        )));
    }

    let day = result.sign_in_count.ok_or_else(|| {
        DriveError::InvalidResponse("task result has no signInCount".to_string())
    })?;
    let tiers = result.sign_in_infos.ok_or_else(|| {
        DriveError::InvalidResponse("task result has no signInInfos".to_string())
    })?;

    match select_tier(&tiers, day) {
        Some(tier) => Ok(CallOutcome::Success(daily_labels(tier))),
        None => Ok(CallOutcome::Failed(format!(
            "no sign-in tier found for day {day}"
        ))),
    }
}

// ============================================================================
// Tier Selection
// ============================================================================

/// Returns the first tier whose day equals `day`.
pub fn select_tier(tiers: &[RewardTier], day: u32) -> Option<&RewardTier> {
    tiers.iter().find(|tier| tier.day_number() == Some(day))
}

/// Extracts the reward and task labels from a tier.
pub fn daily_labels(tier: &RewardTier) -> DailyTask {
    let mut labels = DailyTask::default();

    for entry in &tier.rewards {
        let name = entry.name.as_deref().unwrap_or_default();
        match entry.kind.as_deref() {
            Some(REWARD_TYPE_SIGN_IN) => labels.reward = name.to_string(),
            Some(REWARD_TYPE_TASK) => {
                let remind = entry.remind.as_deref().unwrap_or_default();
                labels.task = format!("{remind} ({name})");
            }
            _ => {}
        }
    }

    labels
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_refresh_success_prefers_user_name() {
        let body = json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "user_name": "alice",
            "nick_name": "Alice A."
        });

        let outcome = parse_refresh(body).unwrap();
        assert_eq!(
            outcome,
            CallOutcome::Success(RefreshedSession {
                credentials: CredentialPair::new("new-access", "new-refresh"),
                user_name: "alice".to_string(),
            })
        );
    }

    #[test]
    fn test_refresh_falls_back_to_nick_name() {
        let body = json!({
            "access_token": "a",
            "refresh_token": "r",
            "user_name": "",
            "nick_name": "Alice A."
        });

        let CallOutcome::Success(session) = parse_refresh(body).unwrap() else {
            panic!("expected success");
        };
        assert_eq!(session.user_name, "Alice A.");
    }

    #[test]
    fn test_refresh_expired_codes() {
        for code in EXPIRED_TOKEN_CODES {
            let body = json!({"code": code, "message": "refresh token is expired"});
            assert_eq!(
                parse_refresh(body).unwrap(),
                CallOutcome::Expired("refresh token is expired".to_string())
            );
        }
    }

    #[test]
    fn test_refresh_other_provider_error_is_failure() {
        let body = json!({"code": "Throttling", "message": "too many requests"});
        assert_eq!(
            parse_refresh(body).unwrap(),
            CallOutcome::Failed("too many requests".to_string())
        );
    }

    #[test]
    fn test_refresh_malformed() {
        assert!(matches!(
            parse_refresh(json!({"unexpected": true})),
            Err(DriveError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_refresh(json!([1, 2, 3])),
            Err(DriveError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_check_in_success() {
        let body = json!({"success": true, "result": {"signInCount": 5}});
        assert_eq!(
            parse_check_in(body).unwrap(),
            CallOutcome::Success(CheckIn { sign_in_count: 5 })
        );
    }

    #[test]
    fn test_check_in_without_success_flag() {
        let body = json!({"code": "AccessTokenInvalid", "message": "access token is invalid"});
        assert_eq!(
            parse_check_in(body).unwrap(),
            CallOutcome::Failed("access token is invalid".to_string())
        );
    }

    #[test]
    fn test_check_in_success_without_count_is_malformed() {
        let body = json!({"success": true, "result": {}});
        assert!(matches!(
            parse_check_in(body),
            Err(DriveError::InvalidResponse(_))
        ));
        assert!(parse_check_in(json!("nope")).is_err());
    }

    #[test]
    fn test_check_in_result_key_may_be_absent_or_null() {
        for body in [json!({"success": true}), json!({"success": true, "result": null})] {
            assert!(matches!(
                parse_check_in(body),
                Err(DriveError::InvalidResponse(_))
            ));
        }
        assert_eq!(
            parse_check_in(json!({"success": false, "message": "busy"})).unwrap(),
            CallOutcome::Failed("busy".to_string())
        );
    }

    #[test]
    fn test_reward() {
        assert!(parse_reward(json!({"success": true, "result": {"name": "x"}}))
            .unwrap()
            .is_success());
        assert_eq!(
            parse_reward(json!({"success": false, "message": "already claimed"})).unwrap(),
            CallOutcome::Failed("already claimed".to_string())
        );
        assert_eq!(
            parse_reward(json!({"success": false, "message": null, "result": {}})).unwrap(),
            CallOutcome::Failed("reward claim was not accepted".to_string())
        );
        assert!(parse_reward(json!(42)).is_err());
    }

    fn tier(day: Value, reward: &str, remind: &str, task: &str) -> Value {
        json!({
            "day": day,
            "rewards": [
                {"name": reward, "remind": "", "type": "dailySignIn"},
                {"name": task, "remind": remind, "type": "dailyTask"},
                {"name": "ignored", "remind": "ignored", "type": "other"}
            ]
        })
    }

    #[test]
    fn test_task_selects_matching_tier_only() {
        let body = json!({
            "success": true,
            "result": {
                "signInCount": 2,
                "signInInfos": [
                    tier(json!(1), "1-day bonus", "upload a file", "day one"),
                    tier(json!(2), "2-day bonus", "watch ad", "bonus space"),
                    tier(json!(3), "3-day bonus", "share a file", "day three"),
                ]
            }
        });

        assert_eq!(
            parse_task(body).unwrap(),
            CallOutcome::Success(DailyTask {
                reward: "2-day bonus".to_string(),
                task: "watch ad (bonus space)".to_string(),
            })
        );
    }

    #[test]
    fn test_task_accepts_string_days() {
        let body = json!({
            "success": true,
            "result": {
                "signInCount": 3,
                "signInInfos": [tier(json!("3"), "3-day bonus", "share", "share a file")]
            }
        });

        let CallOutcome::Success(labels) = parse_task(body).unwrap() else {
            panic!("expected success");
        };
        assert_eq!(labels.reward, "3-day bonus");
    }

    #[test]
    fn test_task_without_matching_tier_is_failure() {
        let body = json!({
            "success": true,
            "result": {
                "signInCount": 9,
                "signInInfos": [tier(json!(1), "a", "b", "c")]
            }
        });

        assert_eq!(
            parse_task(body).unwrap(),
            CallOutcome::Failed("no sign-in tier found for day 9".to_string())
        );
    }

    #[test]
    fn test_task_without_result() {
        assert_eq!(
            parse_task(json!({"message": "rate limited"})).unwrap(),
            CallOutcome::Failed("rate limited".to_string())
        );
        assert!(matches!(
            parse_task(json!({"success": true, "result": {"signInCount": 1}})),
            Err(DriveError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_select_tier_first_match_wins() {
        let tiers: Vec<RewardTier> = serde_json::from_value(json!([
            {"day": 2, "rewards": [{"name": "first", "type": "dailySignIn"}]},
            {"day": 2, "rewards": [{"name": "second", "type": "dailySignIn"}]}
        ]))
        .unwrap();

        let selected = select_tier(&tiers, 2).unwrap();
        assert_eq!(daily_labels(selected).reward, "first");
        assert!(select_tier(&tiers, 1).is_none());
    }
}

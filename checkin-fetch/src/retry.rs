//! Retry envelope for single network operations.
//!
//! Each operation gets its own [`RetryPolicy`]: a fixed attempt ceiling and a
//! uniformly random pause between attempts. There is no exponential growth
//! and no budget shared across operations.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Errors that know whether another attempt could help.
pub trait Retryable {
    /// Returns true if the failed call is worth repeating.
    fn is_retryable(&self) -> bool;
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Bounded-attempt, randomized-backoff policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Lower bound of the pause between attempts.
    pub min_delay: Duration,
    /// Upper bound of the pause between attempts.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the default 5–30 s pause window.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Single attempt, no pause.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the pause window. Bounds given in the wrong order are swapped.
    pub fn with_delay_range(mut self, min: Duration, max: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    /// Sets the attempt ceiling (at least one).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Draws the next pause uniformly from the window.
    pub fn next_delay(&self) -> Duration {
        let min = millis(self.min_delay);
        let max = millis(self.max_delay);
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// Runs `op` until it succeeds, fails terminally, or runs out of attempts.
    ///
    /// Returns the first success or the last error.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(label, attempt, max_attempts, "Starting attempt");

            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_retryable() {
                        warn!(label, attempt, error = %error, "Attempt failed, not retryable");
                        return Err(error);
                    }
                    if attempt >= max_attempts {
                        warn!(label, attempt, error = %error, "Attempt failed, giving up");
                        return Err(error);
                    }

                    let delay = self.next_delay();
                    warn!(
                        label,
                        attempt,
                        error = %error,
                        delay_ms = millis(delay),
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Step Policies
// ============================================================================

/// One policy per check-in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPolicies {
    /// Credential refresh.
    pub refresh: RetryPolicy,
    /// Daily check-in.
    pub check_in: RetryPolicy,
    /// Reward claim.
    pub reward: RetryPolicy,
    /// Task listing; the endpoint is rate sensitive so it waits longer.
    pub task: RetryPolicy,
}

impl StepPolicies {
    /// Same attempt ceiling for every step, no pauses. Used by tests and dry runs.
    pub fn immediate(max_attempts: u32) -> Self {
        let policy = RetryPolicy::no_retry().with_max_attempts(max_attempts);
        Self {
            refresh: policy.clone(),
            check_in: policy.clone(),
            reward: policy.clone(),
            task: policy,
        }
    }
}

impl Default for StepPolicies {
    fn default() -> Self {
        Self {
            refresh: RetryPolicy::new(2),
            check_in: RetryPolicy::new(2),
            reward: RetryPolicy::new(2),
            task: RetryPolicy::new(2)
                .with_delay_range(Duration::from_secs(10), Duration::from_secs(30)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Outcome notification.

use async_trait::async_trait;
use checkin_core::RunReport;
use tracing::info;

/// Delivers the single report of a run.
///
/// Delivery is best-effort: implementations log their own failures and never
/// return them, so a broken webhook cannot stop credential persistence.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message describing `report`.
    async fn report(&self, report: &RunReport);
}

/// Notifier used when no webhook is configured; it only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn report(&self, report: &RunReport) {
        match report {
            RunReport::Success(summary) => info!(
                user = %summary.user_name,
                sign_in_count = summary.sign_in_count,
                reward = %summary.reward,
                task = %summary.task,
                "Check-in succeeded (notifications disabled)"
            ),
            RunReport::Failure { message, .. } => {
                info!(%message, "Check-in failed (notifications disabled)");
            }
        }
    }
}

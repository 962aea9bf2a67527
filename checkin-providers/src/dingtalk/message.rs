//! Markdown rendering of run reports.

use chrono::{DateTime, TimeZone};
use checkin_core::RunReport;
use std::fmt::Display;

/// Title shown in the DingTalk conversation list.
pub const TITLE: &str = "Aliyun Drive check-in";

const COLOR_SUCCESS: &str = "#409eff";
const COLOR_FAILURE: &str = "#f56c6c";

/// Renders `report` as robot markdown, stamped with `now`.
pub fn render<Tz>(report: &RunReport, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (color, status) = if report.is_success() {
        (COLOR_SUCCESS, "Success")
    } else {
        (COLOR_FAILURE, "Failure")
    };

    let mut text = format!(
        "### <font color={color}>[{status}]</font> <font color=#000000>{TITLE}</font>\n *** \n"
    );
    text.push_str(&format!("##### User: {} \n", report.user_name()));

    match report {
        RunReport::Success(summary) => {
            text.push_str(&format!(
                "##### Check-in: {} check-ins this month \n",
                summary.sign_in_count
            ));
            text.push_str(&format!("##### Reward: {} \n", summary.reward));
            text.push_str(&format!("##### Today's task: {}", summary.task));
        }
        RunReport::Failure { message, .. } => {
            text.push_str(&format!("##### API response: {message}"));
        }
    }

    text.push_str(&format!(
        "\n *** \n \n Reported at: {}",
        now.format("%Y-%m-%d %H:%M:%S")
    ));
    text
}

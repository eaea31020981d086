//! Operator-facing rendering of per-PR outcomes

use crate::notification::NotificationOutcome;
use chrono::{DateTime, Duration, Utc};

pub const TITLE_WIDTH: usize = 70;

/// Fit a title into a fixed-width column: long titles are cut and get `...`,
/// short ones are padded with dots so the status column lines up.
pub fn limit_string_len(value: &str, limit: usize) -> String {
    if value.chars().count() > limit {
        let cut: String = value.chars().take(limit).collect();
        format!("{cut}...")
    } else {
        let padding = limit + 3 - value.chars().count();
        format!("{value}{}", ".".repeat(padding))
    }
}

/// Rough human distance, e.g. "about 5 hours"
pub fn format_distance(duration: Duration) -> String {
    let duration = duration.abs();
    let minutes = duration.num_minutes();
    let hours = duration.num_hours();
    let days = duration.num_days();

    match (days, hours, minutes) {
        (0, 0, 0) => "less than a minute".to_string(),
        (0, 0, 1) => "1 minute".to_string(),
        (0, 0, m) => format!("{m} minutes"),
        (0, 1, _) => "about 1 hour".to_string(),
        (0, h, _) => format!("about {h} hours"),
        (1, _, _) => "1 day".to_string(),
        (d, _, _) => format!("{d} days"),
    }
}

pub fn status_label(outcome: &NotificationOutcome) -> &'static str {
    match outcome {
        NotificationOutcome::Sent { .. } => "SENT",
        NotificationOutcome::Pending { .. } => "PENDING",
        NotificationOutcome::NotRequested { .. } => "NOT REQUESTED",
    }
}

pub fn format_outcome_line(title: &str, outcome: &NotificationOutcome, now: DateTime<Utc>) -> String {
    let title = limit_string_len(title, TITLE_WIDTH);
    match outcome {
        NotificationOutcome::Sent { tier } => {
            format!("✅ {title} {} {}", status_label(outcome), tier.tone.label())
        }
        NotificationOutcome::Pending {
            tier,
            last_notified_at,
        } => format!(
            "⏳ {title} {} {}h ({} ago)",
            status_label(outcome),
            tier.hours,
            format_distance(now - *last_notified_at)
        ),
        NotificationOutcome::NotRequested { .. } => {
            format!("💤 {title} {}", status_label(outcome))
        }
    }
}

//! Slack Block Kit payloads for reminders

use crate::notification::types::NotificationTone;
use crate::pr::PullRequest;
use serde_json::{json, Value};

/// Fallback text for notifications and clients without block support
pub fn plain_text_notification(tone: NotificationTone) -> String {
    format!("{} - {}", tone.label(), tone.message())
}

/// `⭐️ name` for approving reviewers, `🐢 name` for the rest
pub fn reviewer_summary(pr: &PullRequest) -> String {
    pr.reviewers()
        .map(|r| format!("{} {}", if r.approved { "⭐️" } else { "🐢" }, r.display_name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn reminder_blocks(pr: &PullRequest, tone: NotificationTone, days_open: i64) -> Vec<Value> {
    let mut context = vec![
        json!({ "type": "mrkdwn", "text": pr.title }),
        json!({
            "type": "mrkdwn",
            "text": format!("Author: {} | Days Open: {}", pr.author.display_name, days_open),
        }),
    ];

    let reviewers = reviewer_summary(pr);
    if !reviewers.is_empty() {
        context.push(json!({ "type": "mrkdwn", "text": format!("Participants: {reviewers}") }));
    }

    vec![
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*{}*", tone.label()) },
        }),
        json!({ "type": "divider" }),
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": tone.message() },
        }),
        json!({ "type": "context", "elements": context }),
        json!({
            "type": "actions",
            "elements": [{
                "type": "button",
                "text": { "type": "plain_text", "text": "👀 Review" },
                "url": pr.url,
                "action_id": "noop",
            }],
        }),
    ]
}

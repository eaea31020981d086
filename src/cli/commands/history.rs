use super::Command;
use crate::config::PullmeConfig;
use crate::notification::{
    Clock, EscalationLadder, FileNotificationHistoryStore, NotificationHistory, NotificationHistoryStore,
    SystemClock,
};
use crate::report::format_distance;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Prints the notification tracker, one pull request per line
pub struct HistoryCommand {
    store: FileNotificationHistoryStore,
    ladder: EscalationLadder,
}

impl HistoryCommand {
    pub fn new(config: &PullmeConfig) -> Result<Self> {
        Ok(Self {
            store: FileNotificationHistoryStore::new(config.notifications.tracker_path.clone()),
            ladder: config.ladder()?,
        })
    }
}

/// One line per tracked pull request, oldest id first
pub fn history_lines(history: &NotificationHistory, ladder: &EscalationLadder, now: DateTime<Utc>) -> Vec<String> {
    history
        .iter()
        .map(|(pr_id, record)| {
            let next = ladder.tier_for(record.notification_count);
            format!(
                "PR #{pr_id}: {} reminder(s), last {} ago, next {} after {}h",
                record.notification_count,
                format_distance(now - record.last_notified_at),
                next.tone.label(),
                next.hours
            )
        })
        .collect()
}

impl Command for HistoryCommand {
    async fn execute(&self) -> Result<()> {
        let history = self.store.find_all_notifications().await?;
        if history.is_empty() {
            println!("📭 No reminders recorded in {}", self.store.path().display());
            return Ok(());
        }

        println!("📬 Reminders recorded in {}", self.store.path().display());
        for line in history_lines(&history, &self.ladder, SystemClock.now()) {
            println!("   {line}");
        }
        Ok(())
    }
}

use super::{DeliveryError, NotificationClient};
use crate::notification::types::NotificationTone;
use crate::pr::PullRequest;
use async_trait::async_trait;
use tracing::info;

/// Logs reminders instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotificationClient;

#[async_trait]
impl NotificationClient for ConsoleNotificationClient {
    async fn send_reminder(&self, pr: &PullRequest, tone: NotificationTone) -> Result<(), DeliveryError> {
        info!(
            pr_id = pr.id,
            tone = tone.label(),
            title = %pr.title,
            author = %pr.author.display_name,
            url = %pr.url,
            "Sending PR reminder (dry run)"
        );
        Ok(())
    }
}

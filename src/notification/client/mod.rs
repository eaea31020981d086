//! Reminder delivery
//!
//! The engine only needs to know whether a reminder went out. Formatting and
//! transport belong to the client.

pub mod console;
pub mod slack;
pub mod templates;

pub use console::ConsoleNotificationClient;
pub use slack::SlackNotificationClient;

use super::types::NotificationTone;
use crate::pr::PullRequest;
use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request to chat service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat API call {method} failed: {error}")]
    Api { method: String, error: String },

    #[error(
        "The bot cannot join or access the channel: {channel}. Ensure it is a public channel or invite the bot to a private channel."
    )]
    ChannelInaccessible { channel: String },
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait NotificationClient: Send + Sync {
    async fn send_reminder(&self, pr: &PullRequest, tone: NotificationTone) -> Result<(), DeliveryError>;
}

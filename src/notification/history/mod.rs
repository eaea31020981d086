//! Notification history persistence
//!
//! The history maps pull request ids to the last reminder time and the number of
//! reminders sent so far. A missing history is an empty one, never an error.

pub mod file;
pub mod memory;

pub use file::FileNotificationHistoryStore;
pub use memory::InMemoryNotificationHistoryStore;

use super::types::NotificationHistory;
use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error on notification history: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notification history is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Single-writer store for the notification history. `save` replaces the stored
/// mapping as a whole.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait NotificationHistoryStore: Send + Sync {
    async fn find_all_notifications(&self) -> Result<NotificationHistory, HistoryError>;

    async fn save(&self, history: &NotificationHistory) -> Result<(), HistoryError>;
}

use super::{HistoryError, NotificationHistoryStore};
use crate::notification::types::NotificationHistory;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};

pub const DEFAULT_TRACKER_FILE: &str = "pr_notification_tracker.json";

/// History kept as a pretty-printed JSON object on disk
#[derive(Debug, Clone)]
pub struct FileNotificationHistoryStore {
    path: PathBuf,
}

impl FileNotificationHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl NotificationHistoryStore for FileNotificationHistoryStore {
    async fn find_all_notifications(&self) -> Result<NotificationHistory, HistoryError> {
        debug!(path = ?self.path, "Loading notification tracker");

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No notification tracker yet, starting empty");
                return Ok(NotificationHistory::new());
            }
            Err(e) => return Err(e.into()),
        };
        trace!(%content, "Notification tracker content");

        if content.trim().is_empty() {
            return Ok(NotificationHistory::new());
        }

        let history = serde_json::from_str(&content)?;
        debug!("Notification tracker loaded");
        Ok(history)
    }

    async fn save(&self, history: &NotificationHistory) -> Result<(), HistoryError> {
        debug!(path = ?self.path, entries = history.len(), "Saving notification tracker");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let serialized = serde_json::to_string_pretty(history)?;

        // Write to temporary file first, then rename (atomic operation)
        let temp_file = self.temp_path();
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, &self.path).await?;

        debug!("Notification tracker saved");
        Ok(())
    }
}

use super::{HistoryError, NotificationHistoryStore};
use crate::notification::types::NotificationHistory;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-process history, shared between clones. Handy for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationHistoryStore {
    history: Arc<Mutex<NotificationHistory>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryNotificationHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: NotificationHistory) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
            saves: Arc::default(),
        }
    }

    /// Copy of the currently stored mapping
    pub fn snapshot(&self) -> NotificationHistory {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationHistoryStore for InMemoryNotificationHistoryStore {
    async fn find_all_notifications(&self) -> Result<NotificationHistory, HistoryError> {
        Ok(self.snapshot())
    }

    async fn save(&self, history: &NotificationHistory) -> Result<(), HistoryError> {
        *self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = history.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

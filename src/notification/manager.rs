//! Notification decision engine
//!
//! For one pull request: load the history, pick the escalation tier from its
//! notification count, let the handler chain decide, and on "send" deliver the
//! reminder and persist the advanced record. History is only written after a
//! successful delivery, so a failed send is retried on the next run at the same tier.

use super::client::{DeliveryError, NotificationClient};
use super::clock::{Clock, SystemClock};
use super::handlers::{DecisionContext, HandlerChain};
use super::history::{HistoryError, NotificationHistoryStore};
use super::ladder::EscalationLadder;
use super::types::{NotificationHistory, NotificationOutcome, NotificationRecord};
use crate::pr::{PullRequest, PullRequestId};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to deliver reminder for PR #{pr_id}: {source}")]
    Delivery {
        pr_id: PullRequestId,
        #[source]
        source: DeliveryError,
    },

    #[error("Reminder for PR #{pr_id} was delivered but the history could not be saved: {source}")]
    HistoryWrite {
        pr_id: PullRequestId,
        #[source]
        source: HistoryError,
    },
}

pub struct NotificationManager {
    history_store: Arc<dyn NotificationHistoryStore>,
    client: Arc<dyn NotificationClient>,
    ladder: EscalationLadder,
    handlers: HandlerChain,
    clock: Arc<dyn Clock>,
    // records this engine has persisted; also serializes writes
    recorded: Mutex<NotificationHistory>,
}

impl NotificationManager {
    pub fn new(
        history_store: Arc<dyn NotificationHistoryStore>,
        client: Arc<dyn NotificationClient>,
        ladder: EscalationLadder,
        handlers: HandlerChain,
    ) -> Self {
        Self {
            history_store,
            client,
            ladder,
            handlers,
            clock: Arc::new(SystemClock),
            recorded: Mutex::new(NotificationHistory::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ladder(&self) -> &EscalationLadder {
        &self.ladder
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Decide for one pull request, sending and recording a reminder when due
    pub async fn handle_notification(&self, pr: &PullRequest) -> Result<NotificationOutcome, NotificationError> {
        let history = self.load_history().await;
        let notification_count = history.get(&pr.id).map_or(0, |r| r.notification_count);
        let tier = *self.ladder.tier_for(notification_count);

        let context = DecisionContext {
            pr,
            history: &history,
            ladder: &self.ladder,
            now: self.clock.now(),
        };
        let decision = self.handlers.decide(&context);
        debug!(
            pr_id = pr.id,
            send = decision.send,
            decided_by = decision.decided_by.unwrap_or("default"),
            "Notification decision"
        );

        if decision.send {
            self.client
                .send_reminder(pr, tier.tone)
                .await
                .map_err(|source| NotificationError::Delivery { pr_id: pr.id, source })?;
            self.record_notification(pr.id, history).await?;

            return Ok(NotificationOutcome::Sent { tier });
        }

        match decision.last_notified_at {
            Some(last_notified_at) => Ok(NotificationOutcome::Pending {
                tier,
                last_notified_at,
            }),
            None => Ok(NotificationOutcome::NotRequested { tier }),
        }
    }

    /// An unreadable history is treated as empty so one bad file doesn't stop reminders
    async fn load_history(&self) -> NotificationHistory {
        match self.history_store.find_all_notifications().await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Could not load notification history, continuing with an empty one");
                NotificationHistory::new()
            }
        }
    }

    /// Bump the counter for `pr_id` in the snapshot loaded for this call and persist it.
    /// Records saved by concurrent calls are merged back in so none of them is lost.
    async fn record_notification(
        &self,
        pr_id: PullRequestId,
        snapshot: NotificationHistory,
    ) -> Result<NotificationRecord, NotificationError> {
        let mut recorded = self.recorded.lock().await;
        debug!(pr_id, "Updating notification tracker");

        let mut latest = snapshot;
        latest.extend(recorded.iter().map(|(id, record)| (*id, *record)));
        let previous_count = latest.get(&pr_id).map_or(0, |r| r.notification_count);
        let record = NotificationRecord {
            last_notified_at: self.clock.now(),
            notification_count: previous_count.saturating_add(1),
        };
        latest.insert(pr_id, record);

        self.history_store
            .save(&latest)
            .await
            .map_err(|source| NotificationError::HistoryWrite { pr_id, source })?;
        recorded.insert(pr_id, record);

        debug!(pr_id, count = record.notification_count, "Notification tracker updated");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::client::MockNotificationClient;
    use crate::notification::clock::ManualClock;
    use crate::notification::handlers::test_support::*;
    use crate::notification::handlers::{HandlerKind, HandlerSettings};
    use crate::notification::history::{InMemoryNotificationHistoryStore, MockNotificationHistoryStore};
    use crate::notification::types::{EscalationTier, NotificationTone};
    use crate::pr::MergeTaskState;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap()
    }

    fn chain() -> HandlerChain {
        HandlerChain::from_kinds(&HandlerKind::default_order(), &HandlerSettings::default())
    }

    fn manager(
        store: Arc<dyn NotificationHistoryStore>,
        client: MockNotificationClient,
        clock: Arc<ManualClock>,
    ) -> NotificationManager {
        NotificationManager::new(store, Arc::new(client), EscalationLadder::default(), chain()).with_clock(clock)
    }

    #[tokio::test]
    async fn test_first_notification_is_sent_and_recorded() {
        let store = InMemoryNotificationHistoryStore::new();
        let clock = Arc::new(ManualClock::new(start()));
        let mut client = MockNotificationClient::new();
        client
            .expect_send_reminder()
            .withf(|pr, tone| pr.id == 42 && *tone == NotificationTone::FriendlyReminder)
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = manager(Arc::new(store.clone()), client, clock);
        let outcome = manager.handle_notification(&pr(42, "Add login flow")).await.unwrap();

        assert_eq!(
            outcome,
            NotificationOutcome::Sent {
                tier: EscalationTier {
                    tone: NotificationTone::FriendlyReminder,
                    hours: 0
                }
            }
        );
        let record = store.snapshot()[&42];
        assert_eq!(record.notification_count, 1);
        assert_eq!(record.last_notified_at, start());
    }

    #[tokio::test]
    async fn test_vetoed_pr_is_not_requested_and_untouched() {
        let store = InMemoryNotificationHistoryStore::new();
        let clock = Arc::new(ManualClock::new(start()));
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(0);

        let mut pr = pr(42, "Add login flow");
        pr.merge_tasks.push(task("ci/build", MergeTaskState::InProgress));

        let manager = manager(Arc::new(store.clone()), client, clock);
        let outcome = manager.handle_notification(&pr).await.unwrap();

        assert!(matches!(outcome, NotificationOutcome::NotRequested { .. }));
        assert!(store.snapshot().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_leaves_history_alone() {
        let store = InMemoryNotificationHistoryStore::new();
        let clock = Arc::new(ManualClock::new(start()));
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(1).returning(|_, _| {
            Err(DeliveryError::ChannelInaccessible {
                channel: "#reviews".to_string(),
            })
        });

        let manager = manager(Arc::new(store.clone()), client, clock);
        let result = manager.handle_notification(&pr(42, "Add login flow")).await;

        assert!(matches!(result, Err(NotificationError::Delivery { pr_id: 42, .. })));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let mut store = MockNotificationHistoryStore::new();
        store
            .expect_find_all_notifications()
            .returning(|| Ok(NotificationHistory::new()));
        store.expect_save().times(1).returning(|_| {
            Err(HistoryError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(1).returning(|_, _| Ok(()));
        let clock = Arc::new(ManualClock::new(start()));

        let manager = manager(Arc::new(store), client, clock);
        let result = manager.handle_notification(&pr(42, "Add login flow")).await;

        assert!(matches!(result, Err(NotificationError::HistoryWrite { pr_id: 42, .. })));
    }

    #[tokio::test]
    async fn test_unreadable_history_is_treated_as_empty() {
        let mut store = MockNotificationHistoryStore::new();
        store.expect_find_all_notifications().returning(|| {
            Err(HistoryError::Corrupt(
                serde_json::from_str::<NotificationHistory>("{").unwrap_err(),
            ))
        });
        store
            .expect_save()
            .withf(|history| history.get(&42).map(|r| r.notification_count) == Some(1))
            .times(1)
            .returning(|_| Ok(()));
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(1).returning(|_, _| Ok(()));
        let clock = Arc::new(ManualClock::new(start()));

        let manager = manager(Arc::new(store), client, clock);
        let outcome = manager.handle_notification(&pr(42, "Add login flow")).await.unwrap();
        assert!(outcome.is_sent());
    }

    #[tokio::test]
    async fn test_history_is_read_once_and_other_records_survive() {
        let mut known = NotificationHistory::new();
        for id in [7, 8, 9] {
            known.insert(
                id,
                NotificationRecord {
                    last_notified_at: start() - Duration::hours(2),
                    notification_count: 3,
                },
            );
        }

        let mut store = MockNotificationHistoryStore::new();
        let mut reads = 0;
        store.expect_find_all_notifications().returning(move || {
            reads += 1;
            if reads == 1 {
                Ok(known.clone())
            } else {
                Err(HistoryError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk went away",
                )))
            }
        });
        store
            .expect_save()
            .withf(|history| {
                history.keys().copied().collect::<Vec<_>>() == vec![7, 8, 9, 42]
                    && history[&7].notification_count == 3
                    && history[&42].notification_count == 1
            })
            .times(1)
            .returning(|_| Ok(()));
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(1).returning(|_, _| Ok(()));
        let clock = Arc::new(ManualClock::new(start()));

        let manager = manager(Arc::new(store), client, clock);
        let outcome = manager.handle_notification(&pr(42, "Add login flow")).await.unwrap();
        assert!(outcome.is_sent());
    }

    #[tokio::test]
    async fn test_pending_reports_last_notification() {
        let last = start() - Duration::hours(1);
        let mut history = NotificationHistory::new();
        history.insert(
            42,
            NotificationRecord {
                last_notified_at: last,
                notification_count: 1,
            },
        );
        let store = InMemoryNotificationHistoryStore::with_history(history.clone());
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(0);
        let clock = Arc::new(ManualClock::new(start()));

        let manager = manager(Arc::new(store.clone()), client, clock);
        let outcome = manager.handle_notification(&pr(42, "Add login flow")).await.unwrap();

        assert_eq!(
            outcome,
            NotificationOutcome::Pending {
                tier: EscalationTier {
                    tone: NotificationTone::SlowingDown,
                    hours: 3
                },
                last_notified_at: last,
            }
        );
        assert_eq!(store.snapshot(), history);
    }
}

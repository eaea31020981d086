//! Batch orchestration
//!
//! Fetches open pull requests, runs the engine once per pull request and prints one
//! line per outcome. A failure on one pull request is logged and the batch moves on.

use crate::notification::{NotificationManager, NotificationOutcome};
use crate::pr::PullRequestSource;
use crate::report::format_outcome_line;
use crate::shutdown::ShutdownSignal;
use crate::telemetry::{create_run_span, generate_correlation_id};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: usize,
    pub pending: usize,
    pub not_requested: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &NotificationOutcome) {
        match outcome {
            NotificationOutcome::Sent { .. } => self.sent += 1,
            NotificationOutcome::Pending { .. } => self.pending += 1,
            NotificationOutcome::NotRequested { .. } => self.not_requested += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sent + self.pending + self.not_requested + self.failed
    }
}

pub struct ReminderController {
    source: Arc<dyn PullRequestSource>,
    manager: Arc<NotificationManager>,
}

impl ReminderController {
    pub fn new(source: Arc<dyn PullRequestSource>, manager: Arc<NotificationManager>) -> Self {
        Self { source, manager }
    }

    /// One pass over every open pull request
    pub async fn run(&self) -> Result<RunSummary> {
        let repository = self.source.repository_name();
        let correlation_id = generate_correlation_id();
        let span = create_run_span(&repository, &correlation_id);

        self.run_batch(&repository).instrument(span).await
    }

    async fn run_batch(&self, repository: &str) -> Result<RunSummary> {
        info!("Checking for open pull requests in {}", repository);

        let open_prs = match self.source.find_open_pull_requests().await {
            Ok(prs) => prs,
            Err(e) => {
                error!(error = %e, "Failed to fetch open pull requests");
                return Ok(RunSummary::default());
            }
        };
        info!("Found {} open pull requests", open_prs.len());

        let mut summary = RunSummary::default();
        for pr in &open_prs {
            match self.manager.handle_notification(pr).await {
                Ok(outcome) => {
                    summary.record(&outcome);
                    println!("{}", format_outcome_line(&pr.title, &outcome, self.manager.now()));
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(pr_id = pr.id, error = %e, "Failed to handle notification");
                    println!("❌ PR #{}: {}", pr.id, e);
                }
            }
        }

        info!(
            sent = summary.sent,
            pending = summary.pending,
            not_requested = summary.not_requested,
            failed = summary.failed,
            "All done!"
        );
        Ok(summary)
    }
}

/// Repeat `run` every `interval` until shutdown is requested
pub async fn run_periodically(
    controller: &ReminderController,
    interval: Duration,
    mut shutdown: ShutdownSignal,
) -> Result<usize> {
    info!("Starting, press Ctrl+C to stop");
    let mut runs = 0;

    while !shutdown.is_shutdown() {
        if let Err(e) = controller.run().await {
            error!(error = %e, "Reminder run failed");
        }
        runs += 1;

        info!(
            "Waiting for {} seconds before next run (press Ctrl+C to stop)...",
            interval.as_secs()
        );
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.wait() => break,
        }
    }

    info!(runs, "Polling stopped");
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::client::MockNotificationClient;
    use crate::notification::handlers::test_support::pr;
    use crate::notification::{
        EscalationLadder, HandlerChain, HandlerKind, HandlerSettings, InMemoryNotificationHistoryStore,
    };
    use crate::pr::{MockPullRequestSource, SourceError};
    use crate::shutdown::ShutdownCoordinator;

    fn manager(client: MockNotificationClient) -> Arc<NotificationManager> {
        Arc::new(NotificationManager::new(
            Arc::new(InMemoryNotificationHistoryStore::new()),
            Arc::new(client),
            EscalationLadder::default(),
            HandlerChain::from_kinds(&HandlerKind::default_order(), &HandlerSettings::default()),
        ))
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let mut source = MockPullRequestSource::new();
        source.expect_repository_name().return_const("acme/app".to_string());
        source
            .expect_find_open_pull_requests()
            .returning(|| Ok(vec![pr(1, "First"), pr(2, "Second"), pr(3, "[WIP] Third")]));

        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().returning(|pr, _| {
            if pr.id == 1 {
                Err(crate::notification::DeliveryError::Api {
                    method: "chat.postMessage".to_string(),
                    error: "ratelimited".to_string(),
                })
            } else {
                Ok(())
            }
        });

        let controller = ReminderController::new(Arc::new(source), manager(client));
        let summary = controller.run().await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                sent: 1,
                pending: 0,
                not_requested: 1,
                failed: 1
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[tokio::test]
    async fn test_source_failure_yields_empty_run() {
        let mut source = MockPullRequestSource::new();
        source.expect_repository_name().return_const("acme/app".to_string());
        source.expect_find_open_pull_requests().returning(|| {
            Err(SourceError::Api {
                status: 401,
                message: "Unauthorized".to_string(),
            })
        });
        let mut client = MockNotificationClient::new();
        client.expect_send_reminder().times(0);

        let controller = ReminderController::new(Arc::new(source), manager(client));
        assert_eq!(controller.run().await.unwrap(), RunSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_stops_on_shutdown() {
        let mut source = MockPullRequestSource::new();
        source.expect_repository_name().return_const("acme/app".to_string());
        source.expect_find_open_pull_requests().returning(|| Ok(vec![]));
        let controller = ReminderController::new(Arc::new(source), manager(MockNotificationClient::new()));

        let coordinator = ShutdownCoordinator::new();
        let signal = coordinator.subscribe();
        let interval = Duration::from_secs(60);

        let stopper = async {
            tokio::time::sleep(Duration::from_secs(150)).await;
            coordinator.trigger();
        };
        let (runs, ()) = tokio::join!(run_periodically(&controller, interval, signal), stopper);

        assert_eq!(runs.unwrap(), 3);
    }
}

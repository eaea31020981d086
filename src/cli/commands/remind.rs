use super::Command;
use crate::config::PullmeConfig;
use crate::controller::{run_periodically, ReminderController, RunSummary};
use crate::notification::{
    Clock, ConsoleNotificationClient, FileNotificationHistoryStore, InMemoryNotificationHistoryStore, NotificationClient,
    NotificationHistoryStore, NotificationManager, SlackNotificationClient, SystemClock,
};
use crate::pr::BitbucketPullRequestSource;
use crate::shutdown::ShutdownCoordinator;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Default command: check open pull requests once, or keep polling
pub struct RemindCommand {
    config: PullmeConfig,
    dry_run: bool,
}

impl RemindCommand {
    pub fn new(config: PullmeConfig, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    /// A dry run reads the real tracker but records into memory only
    async fn history_store(&self) -> Arc<dyn NotificationHistoryStore> {
        let file_store = FileNotificationHistoryStore::new(self.config.notifications.tracker_path.clone());
        if !self.dry_run {
            return Arc::new(file_store);
        }

        let seed = file_store.find_all_notifications().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read notification tracker, dry run starts empty");
            Default::default()
        });
        Arc::new(InMemoryNotificationHistoryStore::with_history(seed))
    }

    fn client(&self, clock: Arc<dyn Clock>) -> Arc<dyn NotificationClient> {
        match (&self.config.slack.token, &self.config.slack.channel) {
            (Some(token), Some(channel)) if !self.dry_run => Arc::new(SlackNotificationClient::with_base_url(
                token.clone(),
                channel.clone(),
                self.config.slack.api_base_url.clone(),
            )
            .with_clock(clock)),
            _ => Arc::new(ConsoleNotificationClient),
        }
    }

    pub async fn build_controller(&self) -> Result<ReminderController> {
        self.config.validate(self.dry_run)?;

        let source = BitbucketPullRequestSource::new(self.config.bitbucket_settings()?)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let manager = NotificationManager::new(
            self.history_store().await,
            self.client(clock.clone()),
            self.config.ladder()?,
            self.config.handler_chain(),
        )
        .with_clock(clock);

        Ok(ReminderController::new(Arc::new(source), Arc::new(manager)))
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "📊 {} sent, {} pending, {} not requested, {} failed",
        summary.sent, summary.pending, summary.not_requested, summary.failed
    );
}

impl Command for RemindCommand {
    async fn execute(&self) -> Result<()> {
        let controller = self.build_controller().await?;
        if self.dry_run {
            info!("Dry run: reminders are logged, not posted");
        }

        match self.config.polling_interval() {
            None => {
                let summary = controller.run().await?;
                print_summary(&summary);
            }
            Some(interval) => {
                let coordinator = ShutdownCoordinator::new();
                coordinator.install_signal_handlers();
                let runs = run_periodically(&controller, interval, coordinator.subscribe()).await?;
                println!("👋 Stopped after {runs} run(s)");
            }
        }
        Ok(())
    }
}

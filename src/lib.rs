// pullme - escalating review reminders for open pull requests
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod controller;
pub mod notification;
pub mod pr;
pub mod report;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use config::PullmeConfig;
pub use controller::{run_periodically, ReminderController, RunSummary};
pub use notification::{
    EscalationLadder, EscalationTier, HandlerChain, HandlerKind, NotificationClient, NotificationHistoryStore,
    NotificationManager, NotificationOutcome, NotificationTone,
};
pub use pr::{BitbucketPullRequestSource, PullRequest, PullRequestSource};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
pub use telemetry::{create_run_span, generate_correlation_id, init_telemetry};

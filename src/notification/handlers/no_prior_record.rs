use super::{DecisionContext, DecisionHandler};
use crate::notification::types::NotificationDecision;
use tracing::debug;

/// First reminder for a pull request goes out straight away
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPriorRecordHandler;

impl DecisionHandler for NoPriorRecordHandler {
    fn name(&self) -> &'static str {
        "no_prior_record"
    }

    fn can_handle(&self, context: &DecisionContext<'_>) -> bool {
        context.record().is_none()
    }

    fn handle(&self, context: &DecisionContext<'_>) -> NotificationDecision {
        debug!(
            pr_id = context.pr.id,
            "Notification should be sent because the PR has no prior record"
        );
        NotificationDecision {
            send: true,
            last_notified_at: Some(context.now),
            decided_by: Some(self.name()),
        }
    }
}

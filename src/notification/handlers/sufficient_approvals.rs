use super::{DecisionContext, DecisionHandler};
use crate::notification::types::NotificationDecision;
use tracing::debug;

/// Stops reminders once enough reviewers have approved
#[derive(Debug, Clone)]
pub struct SufficientApprovalsHandler {
    required_approvals: usize,
}

impl SufficientApprovalsHandler {
    /// A threshold of zero would veto every pull request, so it is raised to one
    pub fn new(required_approvals: usize) -> Self {
        Self {
            required_approvals: required_approvals.max(1),
        }
    }

    pub fn required_approvals(&self) -> usize {
        self.required_approvals
    }
}

impl DecisionHandler for SufficientApprovalsHandler {
    fn name(&self) -> &'static str {
        "sufficient_approvals"
    }

    fn can_handle(&self, context: &DecisionContext<'_>) -> bool {
        context.pr.approval_count() >= self.required_approvals
    }

    fn handle(&self, context: &DecisionContext<'_>) -> NotificationDecision {
        debug!(
            pr_id = context.pr.id,
            approvals = context.pr.approval_count(),
            required = self.required_approvals,
            "Notification should not be sent because there are sufficient approvals"
        );
        NotificationDecision::veto(self.name())
    }
}

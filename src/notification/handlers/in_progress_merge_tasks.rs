use super::{DecisionContext, DecisionHandler};
use crate::notification::types::NotificationDecision;
use tracing::debug;

/// Holds reminders while any merge task (CI build, merge check) has not succeeded.
/// Keys in `ignored_keys` are skipped; everything else, recognised or not, counts.
#[derive(Debug, Clone)]
pub struct InProgressMergeTasksHandler {
    ignored_keys: Vec<String>,
}

impl InProgressMergeTasksHandler {
    pub fn new(ignored_keys: Vec<String>) -> Self {
        Self { ignored_keys }
    }

    fn is_ignored(&self, key: &str) -> bool {
        self.ignored_keys.iter().any(|ignored| ignored == key)
    }
}

impl DecisionHandler for InProgressMergeTasksHandler {
    fn name(&self) -> &'static str {
        "in_progress_merge_tasks"
    }

    fn can_handle(&self, context: &DecisionContext<'_>) -> bool {
        context
            .pr
            .merge_tasks
            .iter()
            .filter(|task| !self.is_ignored(&task.key))
            .any(|task| !task.is_successful())
    }

    fn handle(&self, context: &DecisionContext<'_>) -> NotificationDecision {
        debug!(
            pr_id = context.pr.id,
            "Notification should not be sent because there are in-progress merge tasks"
        );
        NotificationDecision::veto(self.name())
    }
}

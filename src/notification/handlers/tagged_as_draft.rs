use super::{DecisionContext, DecisionHandler};
use crate::notification::types::NotificationDecision;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static DRAFT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:draft|wip|do not merge)\]").expect("draft tag pattern is valid")
});

/// Skips pull requests whose title carries a `[draft]`, `[wip]` or `[do not merge]` tag
#[derive(Debug, Clone, Default)]
pub struct TaggedAsDraftHandler;

impl TaggedAsDraftHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn is_tagged(title: &str) -> bool {
        DRAFT_TAG.is_match(title)
    }
}

impl DecisionHandler for TaggedAsDraftHandler {
    fn name(&self) -> &'static str {
        "tagged_as_draft"
    }

    fn can_handle(&self, context: &DecisionContext<'_>) -> bool {
        Self::is_tagged(&context.pr.title)
    }

    fn handle(&self, context: &DecisionContext<'_>) -> NotificationDecision {
        debug!(pr_id = context.pr.id, "PR is tagged as draft, skipping notification");
        NotificationDecision::veto(self.name())
    }
}

//! Notification decision handlers
//!
//! Each handler is a small policy that may claim a pull request and decide whether a
//! reminder goes out. The chain asks handlers in order and the first one that claims
//! the pull request decides; later handlers are never consulted. When nobody claims
//! it, no reminder is sent.

pub mod in_progress_merge_tasks;
pub mod interval_exceeded;
pub mod no_prior_record;
pub mod sufficient_approvals;
pub mod tagged_as_draft;

pub use in_progress_merge_tasks::InProgressMergeTasksHandler;
pub use interval_exceeded::IntervalExceededHandler;
pub use no_prior_record::NoPriorRecordHandler;
pub use sufficient_approvals::SufficientApprovalsHandler;
pub use tagged_as_draft::TaggedAsDraftHandler;

use super::ladder::EscalationLadder;
use super::types::{NotificationDecision, NotificationHistory, NotificationRecord};
use crate::pr::{PullRequest, CODEOWNERS_MERGE_CHECK};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Everything a handler may look at when deciding
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub pr: &'a PullRequest,
    pub history: &'a NotificationHistory,
    pub ladder: &'a EscalationLadder,
    pub now: DateTime<Utc>,
}

impl DecisionContext<'_> {
    pub fn record(&self) -> Option<&NotificationRecord> {
        self.history.get(&self.pr.id)
    }
}

pub trait DecisionHandler: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn can_handle(&self, context: &DecisionContext<'_>) -> bool;

    fn handle(&self, context: &DecisionContext<'_>) -> NotificationDecision;
}

/// Handler names as they appear in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    InProgressMergeTasks,
    SufficientApprovals,
    TaggedAsDraft,
    NoPriorRecord,
    IntervalExceeded,
}

impl HandlerKind {
    /// Vetoes first, then the handlers that can send
    pub fn default_order() -> Vec<HandlerKind> {
        vec![
            HandlerKind::InProgressMergeTasks,
            HandlerKind::SufficientApprovals,
            HandlerKind::TaggedAsDraft,
            HandlerKind::NoPriorRecord,
            HandlerKind::IntervalExceeded,
        ]
    }
}

/// Handler-level knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSettings {
    pub required_approvals: usize,
    pub ignored_merge_task_keys: Vec<String>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            required_approvals: 2,
            ignored_merge_task_keys: vec![CODEOWNERS_MERGE_CHECK.to_string()],
        }
    }
}

#[derive(Debug, Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn DecisionHandler>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<Box<dyn DecisionHandler>>) -> Self {
        Self { handlers }
    }

    pub fn from_kinds(kinds: &[HandlerKind], settings: &HandlerSettings) -> Self {
        let handlers = kinds
            .iter()
            .map(|kind| -> Box<dyn DecisionHandler> {
                match kind {
                    HandlerKind::InProgressMergeTasks => Box::new(InProgressMergeTasksHandler::new(
                        settings.ignored_merge_task_keys.clone(),
                    )),
                    HandlerKind::SufficientApprovals => {
                        Box::new(SufficientApprovalsHandler::new(settings.required_approvals))
                    }
                    HandlerKind::TaggedAsDraft => Box::new(TaggedAsDraftHandler::new()),
                    HandlerKind::NoPriorRecord => Box::new(NoPriorRecordHandler),
                    HandlerKind::IntervalExceeded => Box::new(IntervalExceededHandler),
                }
            })
            .collect();

        Self::new(handlers)
    }

    pub fn decide(&self, context: &DecisionContext<'_>) -> NotificationDecision {
        debug!(pr_id = context.pr.id, "Determining if notification should be sent");

        self.handlers
            .iter()
            .find(|handler| handler.can_handle(context))
            .map(|handler| handler.handle(context))
            .unwrap_or_else(NotificationDecision::fallback)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

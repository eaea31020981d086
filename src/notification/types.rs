use crate::pr::PullRequestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Message style for a reminder. Later tones are used as a pull request keeps waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTone {
    FriendlyReminder,
    SlowingDown,
    UrgentReviewRequest,
    Critical,
}

impl NotificationTone {
    /// Headline shown above the reminder
    pub fn label(self) -> &'static str {
        match self {
            NotificationTone::FriendlyReminder => "⭐️ Friendly reminder",
            NotificationTone::SlowingDown => "🐌 Code review is slowing down",
            NotificationTone::UrgentReviewRequest => "🧨 Urgent review request",
            NotificationTone::Critical => "🚨 PR blocking progress",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            NotificationTone::FriendlyReminder => {
                "Just a friendly reminder to review this Pull Request at your earliest convenience. 🕰️"
            }
            NotificationTone::SlowingDown => {
                "This PR is lagging behind. Your timely review would be greatly appreciated! 🐌"
            }
            NotificationTone::UrgentReviewRequest => {
                "This PR has been pending review for a while. Please give it your immediate attention. 🚧"
            }
            NotificationTone::Critical => {
                "This PR is critically delaying our progress. Immediate review is required! 🛑"
            }
        }
    }
}

impl fmt::Display for NotificationTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One step of the escalation ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTier {
    pub tone: NotificationTone,
    /// Minimum whole hours since the previous reminder before this tier may fire
    pub hours: u64,
}

/// Durable fact about one pull request: when we last reminded, and how often in total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub last_notified_at: DateTime<Utc>,
    pub notification_count: u32,
}

pub type NotificationHistory = BTreeMap<PullRequestId, NotificationRecord>;

/// Verdict of the handler chain for a single pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationDecision {
    pub send: bool,
    /// Present when a prior record exists, so callers can report elapsed time
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Name of the handler that claimed the pull request; `None` for the fallback
    pub decided_by: Option<&'static str>,
}

impl NotificationDecision {
    /// Fallback when no handler claims the pull request
    pub fn fallback() -> Self {
        Self {
            send: false,
            last_notified_at: None,
            decided_by: None,
        }
    }

    pub fn veto(handler: &'static str) -> Self {
        Self {
            send: false,
            last_notified_at: None,
            decided_by: Some(handler),
        }
    }
}

/// What happened to one pull request in a run. Carries nothing beyond what reporting needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent {
        tier: EscalationTier,
    },
    Pending {
        tier: EscalationTier,
        last_notified_at: DateTime<Utc>,
    },
    NotRequested {
        tier: EscalationTier,
    },
}

impl NotificationOutcome {
    pub fn tier(&self) -> &EscalationTier {
        match self {
            NotificationOutcome::Sent { tier }
            | NotificationOutcome::Pending { tier, .. }
            | NotificationOutcome::NotRequested { tier } => tier,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent { .. })
    }
}

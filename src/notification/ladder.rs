//! Escalation ladder
//!
//! An ordered list of tiers, each pairing a tone with the minimum number of hours
//! that must pass since the previous reminder. The notification count of a pull
//! request selects the tier; counts past the end stay on the last (harshest) tier.

use super::types::{EscalationTier, NotificationTone};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LadderError {
    #[error("escalation ladder must contain at least one tier")]
    Empty,

    #[error("first escalation tier must have 0 hours so the first reminder goes out immediately (found {0})")]
    FirstTierNotImmediate(u64),

    #[error("escalation tiers must be sorted by hours: tier {index} has {hours}h after {previous}h")]
    Unsorted { index: usize, hours: u64, previous: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationLadder {
    tiers: Vec<EscalationTier>,
}

impl EscalationLadder {
    pub fn new(tiers: Vec<EscalationTier>) -> Result<Self, LadderError> {
        let first = tiers.first().ok_or(LadderError::Empty)?;
        if first.hours != 0 {
            return Err(LadderError::FirstTierNotImmediate(first.hours));
        }

        for (index, pair) in tiers.windows(2).enumerate() {
            if pair[1].hours < pair[0].hours {
                return Err(LadderError::Unsorted {
                    index: index + 1,
                    hours: pair[1].hours,
                    previous: pair[0].hours,
                });
            }
        }

        Ok(Self { tiers })
    }

    /// Tier for a pull request that has already been reminded `notification_count` times
    pub fn tier_for(&self, notification_count: u32) -> &EscalationTier {
        let index = (notification_count as usize).min(self.tiers.len() - 1);
        &self.tiers[index]
    }

    pub fn tiers(&self) -> &[EscalationTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Never true: construction rejects empty ladders
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl Default for EscalationLadder {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

pub fn default_tiers() -> Vec<EscalationTier> {
    vec![
        EscalationTier {
            tone: NotificationTone::FriendlyReminder,
            hours: 0,
        },
        EscalationTier {
            tone: NotificationTone::SlowingDown,
            hours: 3,
        },
        EscalationTier {
            tone: NotificationTone::UrgentReviewRequest,
            hours: 24,
        },
        EscalationTier {
            tone: NotificationTone::Critical,
            hours: 36,
        },
    ]
}

use super::{DecisionContext, DecisionHandler};
use crate::notification::types::NotificationDecision;
use tracing::debug;

/// Re-sends once the wait required by the current escalation tier has passed.
/// Elapsed time is counted in whole hours, rounded down.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalExceededHandler;

impl DecisionHandler for IntervalExceededHandler {
    fn name(&self) -> &'static str {
        "interval_exceeded"
    }

    fn can_handle(&self, context: &DecisionContext<'_>) -> bool {
        context.record().is_some()
    }

    fn handle(&self, context: &DecisionContext<'_>) -> NotificationDecision {
        let Some(record) = context.record() else {
            return NotificationDecision::fallback();
        };

        let hours_since = (context.now - record.last_notified_at).num_hours();
        let tier = context.ladder.tier_for(record.notification_count);
        let send = u64::try_from(hours_since).is_ok_and(|elapsed| elapsed >= tier.hours);

        debug!(
            pr_id = context.pr.id,
            hours_since,
            interval_hours = tier.hours,
            send,
            "Interval check complete"
        );

        NotificationDecision {
            send,
            last_notified_at: Some(record.last_notified_at),
            decided_by: Some(self.name()),
        }
    }
}

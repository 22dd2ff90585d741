//! Poll-driven state machine for daily-times mode.

use crate::{Trigger, compute_next_time, is_passed};
use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

/// Lifecycle of a [`PostScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SchedulerPhase {
    /// No next post time computed yet.
    #[display("idle")]
    Idle,
    /// Next post time armed.
    #[display("waiting")]
    Waiting,
    /// A due post has been handed off but not yet dispatched.
    #[display("firing")]
    Firing,
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The armed slot has passed and a post should be dispatched.
    PostDue {
        /// The slot that fired.
        scheduled_for: NaiveDateTime,
    },
    /// Nothing to do yet.
    NotDue,
}

/// Tracks the next due slot from a table of daily triggers.
///
/// The scheduler owns its state exclusively. Firing a slot recomputes the
/// next one before returning, so a slow publish can never cause the same slot
/// to fire on the following tick.
#[derive(Debug, Clone)]
pub struct PostScheduler {
    triggers: Vec<Trigger>,
    next_post_time: Option<NaiveDateTime>,
    phase: SchedulerPhase,
}

impl PostScheduler {
    /// Create an idle scheduler.
    pub fn new(triggers: Vec<Trigger>) -> Self {
        Self {
            triggers,
            next_post_time: None,
            phase: SchedulerPhase::Idle,
        }
    }

    /// Configured triggers.
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// The armed slot, if any.
    pub fn next_post_time(&self) -> Option<NaiveDateTime> {
        self.next_post_time
    }

    /// Current phase.
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Arm the first slot relative to `now`.
    #[instrument(skip(self))]
    pub fn start(&mut self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.next_post_time = compute_next_time(&self.triggers, now);
        self.phase = SchedulerPhase::Waiting;
        info!(next_post_time = ?self.next_post_time, "Scheduler armed");
        self.next_post_time
    }

    /// Check the clock against the armed slot.
    ///
    /// An idle scheduler arms itself and reports `NotDue`. When the slot has
    /// passed (same minute included) the next slot is computed and stored
    /// before `PostDue` is returned.
    pub fn poll_tick(&mut self, now: NaiveDateTime) -> PollOutcome {
        if self.phase == SchedulerPhase::Idle {
            self.start(now);
            return PollOutcome::NotDue;
        }

        let Some(scheduled_for) = self.next_post_time else {
            return PollOutcome::NotDue;
        };
        if !is_passed(&scheduled_for, &now) {
            debug!(%now, next_post_time = %scheduled_for, "Not yet time to post");
            return PollOutcome::NotDue;
        }

        self.next_post_time = compute_next_time(&self.triggers, now);
        self.phase = SchedulerPhase::Firing;
        info!(
            %scheduled_for,
            next_post_time = ?self.next_post_time,
            "Scheduled post is due"
        );
        PollOutcome::PostDue { scheduled_for }
    }

    /// Record that the due post was handed to the publisher.
    pub fn mark_dispatched(&mut self) {
        if self.phase == SchedulerPhase::Firing {
            self.phase = SchedulerPhase::Waiting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_idle_poll_arms_without_firing() {
        let mut scheduler = PostScheduler::new(vec![Trigger::new(9, 30).unwrap()]);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
        assert_eq!(scheduler.poll_tick(at(10, 0)), PollOutcome::NotDue);
        assert_eq!(scheduler.phase(), SchedulerPhase::Waiting);
        assert_eq!(
            scheduler.next_post_time(),
            Some(at(9, 30) + chrono::Duration::days(1))
        );
    }

    #[test]
    fn test_firing_then_dispatched() {
        let mut scheduler = PostScheduler::new(vec![Trigger::new(9, 30).unwrap()]);
        scheduler.start(at(9, 0));
        assert!(matches!(
            scheduler.poll_tick(at(9, 35)),
            PollOutcome::PostDue { .. }
        ));
        assert_eq!(scheduler.phase(), SchedulerPhase::Firing);
        scheduler.mark_dispatched();
        assert_eq!(scheduler.phase(), SchedulerPhase::Waiting);
    }
}

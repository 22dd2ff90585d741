//! Scheduling strategy selection.

use crate::Trigger;
use chirp_error::ConfigError;
use std::collections::HashSet;
use std::time::Duration;

/// Default poll interval for daily-times mode: seven minutes.
///
/// Deliberately coarser than the trigger table so the publish moment jitters.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(7 * 60);

/// How proactive posts are timed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Post at fixed local times of day, checked every `poll_interval`.
    DailyTimes {
        /// Distinct times of day.
        triggers: Vec<Trigger>,
        /// How often the clock is checked.
        poll_interval: Duration,
    },
    /// Post on startup, then `post_frequency` after each publish.
    FixedInterval {
        /// Delay between one publish finishing and the next starting.
        post_frequency: Duration,
    },
}

impl ScheduleMode {
    /// Daily-times mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `triggers` is empty or repeats a time, or
    /// when `poll_interval` is zero.
    #[track_caller]
    pub fn daily(triggers: Vec<Trigger>, poll_interval: Duration) -> Result<Self, ConfigError> {
        if triggers.is_empty() {
            return Err(ConfigError::invalid(
                "post_times",
                "a daily schedule needs at least one post time",
            ));
        }
        let mut seen = HashSet::new();
        for trigger in &triggers {
            if !seen.insert(*trigger) {
                return Err(ConfigError::invalid(
                    "post_times",
                    format!("{} is listed more than once", trigger),
                ));
            }
        }
        if poll_interval.is_zero() {
            return Err(ConfigError::invalid(
                "post_interval_length",
                "must be greater than zero",
            ));
        }
        Ok(Self::DailyTimes {
            triggers,
            poll_interval,
        })
    }

    /// Fixed-interval mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `post_frequency` is zero.
    #[track_caller]
    pub fn fixed(post_frequency: Duration) -> Result<Self, ConfigError> {
        if post_frequency.is_zero() {
            return Err(ConfigError::invalid(
                "post_frequency",
                "must be greater than zero",
            ));
        }
        Ok(Self::FixedInterval { post_frequency })
    }

    /// Short mode name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DailyTimes { .. } => "daily-times",
            Self::FixedInterval { .. } => "fixed-interval",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_requires_triggers() {
        assert!(ScheduleMode::daily(vec![], DEFAULT_POLL_INTERVAL).is_err());
    }

    #[test]
    fn test_daily_rejects_duplicates() {
        let t = Trigger::new(9, 30).unwrap();
        let err = ScheduleMode::daily(vec![t, t], DEFAULT_POLL_INTERVAL).unwrap_err();
        assert_eq!(err.setting(), Some("post_times"));
        assert!(err.to_string().contains("09:30"));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let t = Trigger::new(9, 30).unwrap();
        assert!(ScheduleMode::daily(vec![t], Duration::ZERO).is_err());
        assert!(ScheduleMode::fixed(Duration::ZERO).is_err());
        assert_eq!(
            ScheduleMode::fixed(Duration::from_secs(60)).unwrap().name(),
            "fixed-interval"
        );
    }
}

//! Wall-clock arithmetic at whole-minute resolution.
//!
//! "Has this slot passed" is decided by comparing calendar components, not by
//! subtracting timestamps, so local daylight-saving shifts cannot make a slot
//! look early or late.

use crate::Trigger;
use chrono::{Datelike, Days, NaiveDateTime, Timelike};

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// The system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

fn minute_key(t: &NaiveDateTime) -> (i32, u32, u32, u32, u32) {
    (t.year(), t.month(), t.day(), t.hour(), t.minute())
}

/// Whether `check` is at or before `now`, ignoring seconds.
///
/// Components are compared year, month, day, hour, minute, stopping at the
/// first difference. The same minute counts as passed so a slot never fires
/// twice within it.
pub fn is_passed(check: &NaiveDateTime, now: &NaiveDateTime) -> bool {
    minute_key(check) <= minute_key(now)
}

/// The earliest upcoming occurrence of any trigger.
///
/// Each trigger is placed on `now`'s date at second zero; occurrences that
/// have passed roll over to the next day. Returns `None` only when
/// `triggers` is empty.
pub fn compute_next_time(triggers: &[Trigger], now: NaiveDateTime) -> Option<NaiveDateTime> {
    triggers
        .iter()
        .filter_map(|trigger| {
            let today = now
                .date()
                .and_hms_opt(trigger.hours(), trigger.minutes(), 0)?;
            if is_passed(&today, &now) {
                today.checked_add_days(Days::new(1))
            } else {
                Some(today)
            }
        })
        .min()
}

//! Time-of-day triggers.

use chirp_error::ConfigError;
use serde::{Deserialize, Serialize};

/// A local time of day at which a post is due.
///
/// Always a valid wall-clock time: `hours < 24`, `minutes < 60`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "RawTrigger")]
#[display("{:02}:{:02}", hours, minutes)]
pub struct Trigger {
    hours: u32,
    minutes: u32,
}

#[derive(Deserialize)]
struct RawTrigger {
    hours: u32,
    #[serde(default)]
    minutes: u32,
}

impl TryFrom<RawTrigger> for Trigger {
    type Error = ConfigError;

    fn try_from(raw: RawTrigger) -> Result<Self, Self::Error> {
        Self::new(raw.hours, raw.minutes)
    }
}

impl Trigger {
    /// Create a trigger.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for hours above 23 or minutes above 59.
    #[track_caller]
    pub fn new(hours: u32, minutes: u32) -> Result<Self, ConfigError> {
        if hours >= 24 || minutes >= 60 {
            return Err(ConfigError::invalid(
                "post_times",
                format!(
                    "{}:{:02} is not a time of day, hours must be 0-23 and minutes 0-59",
                    hours, minutes
                ),
            ));
        }
        Ok(Self { hours, minutes })
    }

    /// Hour of day, 0-23.
    pub fn hours(&self) -> u32 {
        self.hours
    }

    /// Minute of hour, 0-59.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Trigger::new(24, 0).is_err());
        assert!(Trigger::new(0, 60).is_err());
        assert!(Trigger::new(23, 59).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Trigger::new(9, 5).unwrap().to_string(), "09:05");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Trigger = serde_json::from_str(r#"{"hours":16,"minutes":30}"#).unwrap();
        assert_eq!(ok, Trigger::new(16, 30).unwrap());

        let on_the_hour: Trigger = serde_json::from_str(r#"{"hours":8}"#).unwrap();
        assert_eq!(on_the_hour.minutes(), 0);

        assert!(serde_json::from_str::<Trigger>(r#"{"hours":25,"minutes":0}"#).is_err());
    }
}

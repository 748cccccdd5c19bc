use std::fmt;

use chrono::{DateTime, Utc};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Whole days, hours, minutes and seconds until a moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Remaining time from `now` to `target`, all zero once `target` has passed.
    pub fn between(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let remaining = (target - now).num_seconds();
        if remaining <= 0 {
            return Self::default();
        }
        Self {
            days: remaining / SECS_PER_DAY,
            hours: (remaining % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (remaining % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: remaining % SECS_PER_MINUTE,
        }
    }

    pub fn is_over(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} days {:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

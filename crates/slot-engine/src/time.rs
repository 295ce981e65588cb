//! Minute-precision, timezone-naive time-of-day values.
//!
//! Times are carried as minutes since midnight so that slot arithmetic is plain
//! integer math. The textual form is zero-padded `HH:MM`. Parsing also accepts
//! the `HH:MM:SS` rendering a SQL `time` column produces, as long as the seconds
//! are `00`, and the end-of-day marker `24:00`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::EngineError;

/// Minutes in one day. `24:00` is the only value allowed to reach it.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A local wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight at the start of the day.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    /// Midnight at the end of the day (`24:00`), usable as a window end.
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from minutes since midnight. Returns `None` past `24:00`.
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes <= MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Build from an hour and minute pair.
    pub const fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 24 || minute >= 60 {
            return None;
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// True when the time falls on a multiple of `step_minutes` from midnight.
    pub fn is_on_grid(self, step_minutes: u16) -> bool {
        step_minutes != 0 && self.0 % step_minutes == 0
    }

    /// Add minutes, returning `None` if the result passes `24:00`.
    pub fn checked_add_minutes(self, minutes: u16) -> Option<Self> {
        Self::from_minutes(self.0.checked_add(minutes)?)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidTime(s.to_string());
        let trimmed = s.trim();

        let mut parts = trimmed.split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = parse_digits(hour).ok_or_else(invalid)?;
        let minute = parse_digits(minute).ok_or_else(invalid)?;

        // Minute precision only: a seconds field is tolerated but must be zero.
        if let Some(second) = second {
            if second.len() != 2 || parse_digits(second) != Some(0) {
                return Err(invalid());
            }
        }

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

fn parse_digits(s: &str) -> Option<u16> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sql_time_rendering() {
        let t: TimeOfDay = "09:30:00".parse().unwrap();
        assert_eq!(t.minutes(), 570);
        assert_eq!(t.to_string(), "09:30");
    }

    #[test]
    fn rejects_nonzero_seconds() {
        assert!("09:30:15".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn end_of_day_is_the_only_hour_24() {
        assert_eq!("24:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::END_OF_DAY);
        assert!("24:30".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn single_digit_hour_is_padded_on_display() {
        let t: TimeOfDay = "8:00".parse().unwrap();
        assert_eq!(t.to_string(), "08:00");
    }
}

//! Scan a rolling window of days for dates worth offering to the client.
//!
//! A candidate date is one whose weekday has at least one availability rule.
//! Whether any slot on it is still open is decided later, once the client
//! picks the date and its appointments are fetched.

use chrono::{Datelike, Days, NaiveDate};

use crate::rules::WeeklySchedule;

/// Horizon used by the booking form.
pub const DEFAULT_HORIZON_DAYS: u32 = 14;

/// Longer horizon used by the veterinarian-profile calendar.
pub const EXTENDED_HORIZON_DAYS: u32 = 30;

/// Dates from `today` through `today + horizon_days - 1`, ascending.
///
/// Stops early if the calendar runs out of representable dates.
pub fn horizon_dates(today: NaiveDate, horizon_days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..u64::from(horizon_days)).map_while(move |offset| today.checked_add_days(Days::new(offset)))
}

/// Candidate booking dates within the horizon, ascending.
///
/// `today` is included. A zero horizon yields nothing.
pub fn scan_horizon(
    schedule: &WeeklySchedule,
    today: NaiveDate,
    horizon_days: u32,
) -> Vec<NaiveDate> {
    horizon_dates(today, horizon_days)
        .filter(|date| schedule.has_rules_on(date.weekday()))
        .collect()
}

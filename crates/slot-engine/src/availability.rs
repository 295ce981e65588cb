//! Bookable dates and open slots for one veterinarian.
//!
//! This is the single entry point every booking surface calls: the date picker
//! asks for [`get_bookable_dates`], the time picker for [`get_open_slots`] or
//! [`open_slots_on`], and the booking submit path runs [`check_booking`] right
//! before inserting. Nothing here reads the clock; `today` is always passed in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::booking::{appointments_on, filter_booked, occupied_times, Appointment};
use crate::error::{EngineError, Result};
use crate::horizon::{horizon_dates, scan_horizon};
use crate::rules::{resolve_rules, WeeklyAvailabilityRule, WeeklySchedule};
use crate::slots::{generate_day_slots, SLOT_MINUTES};
use crate::time::TimeOfDay;

/// Candidate booking dates for a veterinarian within the horizon.
///
/// Resolves `rules` (falling back to the default schedule when empty) and keeps
/// every date from `today` on whose weekday has a rule. A returned date may
/// still turn out fully booked.
pub fn get_bookable_dates(
    veterinarian_id: &str,
    rules: &[WeeklyAvailabilityRule],
    today: NaiveDate,
    horizon_days: u32,
) -> Vec<NaiveDate> {
    let schedule = resolve_rules(veterinarian_id, rules);
    let dates = scan_horizon(&schedule, today, horizon_days);
    debug!(
        "Veterinarian {} has {} candidate dates in {} days from {}",
        veterinarian_id,
        dates.len(),
        horizon_days,
        today
    );
    dates
}

/// Open slots for one date, given that date's rules and its appointments.
///
/// `appointments_on_date` must already be scoped to the same veterinarian and
/// date.
pub fn get_open_slots(
    day_rules: &[WeeklyAvailabilityRule],
    appointments_on_date: &[Appointment],
) -> Vec<TimeOfDay> {
    filter_booked(&generate_day_slots(day_rules), appointments_on_date)
}

/// Open slots on `date` for the schedule's veterinarian.
///
/// Picks the rules for the date's weekday and scopes `appointments` to the
/// veterinarian and date itself, so a broad appointment fetch can be passed
/// as is.
pub fn open_slots_on(
    schedule: &WeeklySchedule,
    date: NaiveDate,
    appointments: &[Appointment],
) -> Vec<TimeOfDay> {
    let occupied = occupied_times(appointments_on(
        appointments,
        schedule.veterinarian_id(),
        date,
    ));
    generate_day_slots(schedule.rules_for_date(date))
        .into_iter()
        .filter(|slot| !occupied.contains(slot))
        .collect()
}

/// One date and the slots still open on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<TimeOfDay>,
}

/// Dates in the horizon that still have at least one open slot.
///
/// Combines the horizon scan with slot generation and booking filtering, so
/// fully booked days are left out.
pub fn open_calendar(
    schedule: &WeeklySchedule,
    appointments: &[Appointment],
    today: NaiveDate,
    horizon_days: u32,
) -> Vec<DayAvailability> {
    horizon_dates(today, horizon_days)
        .filter_map(|date| {
            let slots = open_slots_on(schedule, date, appointments);
            (!slots.is_empty()).then_some(DayAvailability { date, slots })
        })
        .collect()
}

/// A proposed booking about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub veterinarian_id: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

/// Check that a proposed booking still lands on an open slot.
///
/// This is only the check half of a reservation: two clients running it at the
/// same time can both pass. Callers must run it inside the same store
/// transaction as the insert, or back it with a uniqueness constraint on
/// `(veterinarian_id, date, time)` for blocking statuses.
///
/// # Errors
/// `VeterinarianMismatch` when the request names another veterinarian than
/// the schedule, `OffGrid` when the time is not on the 30-minute grid,
/// `OutsideAvailability` when no rule for that weekday offers the slot, and
/// `SlotTaken` when a blocking appointment already holds it.
pub fn check_booking(
    schedule: &WeeklySchedule,
    appointments: &[Appointment],
    request: &BookingRequest,
) -> Result<()> {
    if request.veterinarian_id != schedule.veterinarian_id() {
        return Err(EngineError::VeterinarianMismatch {
            requested: request.veterinarian_id.clone(),
            schedule: schedule.veterinarian_id().to_string(),
        });
    }

    let (date, time) = (request.date, request.time);
    if !time.is_on_grid(SLOT_MINUTES) {
        return Err(EngineError::OffGrid(time));
    }
    if !generate_day_slots(schedule.rules_for_date(date)).contains(&time) {
        return Err(EngineError::OutsideAvailability { date, time });
    }

    let occupied = occupied_times(appointments_on(
        appointments,
        schedule.veterinarian_id(),
        date,
    ));
    if occupied.contains(&time) {
        return Err(EngineError::SlotTaken { date, time });
    }

    Ok(())
}

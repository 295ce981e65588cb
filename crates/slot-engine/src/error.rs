//! Error types for slot-engine operations.
//!
//! Only parsing and validation return errors. Resolving schedules, generating
//! slots, filtering bookings, and scanning the horizon are total.

use chrono::NaiveDate;
use thiserror::Error;

use crate::time::TimeOfDay;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid time of day: '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("Invalid day of week: {0} (expected 0 = Sunday .. 6 = Saturday)")]
    InvalidDayOfWeek(i64),

    #[error("Start time {start} must be before end time {end}")]
    InvertedWindow { start: TimeOfDay, end: TimeOfDay },

    #[error("Time {0} is not on the 30-minute grid")]
    OffGrid(TimeOfDay),

    #[error("Window {start}-{end} overlaps existing availability {existing_start}-{existing_end}")]
    Overlap {
        start: TimeOfDay,
        end: TimeOfDay,
        existing_start: TimeOfDay,
        existing_end: TimeOfDay,
    },

    #[error("No availability covers {date} at {time}")]
    OutsideAvailability { date: NaiveDate, time: TimeOfDay },

    #[error("Booking for veterinarian {requested} checked against the schedule of {schedule}")]
    VeterinarianMismatch { requested: String, schedule: String },

    #[error("Slot {date} at {time} is already booked")]
    SlotTaken { date: NaiveDate, time: TimeOfDay },
}

pub type Result<T> = std::result::Result<T, EngineError>;

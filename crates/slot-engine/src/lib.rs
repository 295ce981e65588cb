//! # slot-engine
//!
//! Appointment availability for veterinary house calls.
//!
//! Turns a veterinarian's recurring weekly windows and their existing bookings
//! into the dates a client can pick and the open 30-minute slots on each date.
//! Everything is pure and synchronous: no I/O, no clock reads. Callers fetch
//! rules and appointments from the store and pass "today" explicitly.
//!
//! ## Modules
//!
//! - [`time`]: `HH:MM` time-of-day values
//! - [`rules`]: weekly rules, default schedule, rule validation
//! - [`slots`]: windows → 30-minute slot labels
//! - [`booking`]: appointment statuses and booked-slot filtering
//! - [`horizon`]: candidate dates within a rolling horizon
//! - [`availability`]: the combined entry points used by booking surfaces
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use slot_engine::{get_bookable_dates, get_open_slots, TimeOfDay, WeeklyAvailabilityRule};
//!
//! let start: TimeOfDay = "09:00".parse().unwrap();
//! let end: TimeOfDay = "10:00".parse().unwrap();
//! let rule = WeeklyAvailabilityRule::new("vet-1", Weekday::Mon, start, end).unwrap();
//!
//! let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
//! let dates = get_bookable_dates("vet-1", &[rule.clone()], monday, 14);
//! assert_eq!(dates.len(), 2);
//!
//! let slots = get_open_slots(&[rule], &[]);
//! let labels: Vec<String> = slots.iter().map(ToString::to_string).collect();
//! assert_eq!(labels, ["09:00", "09:30"]);
//! ```

pub mod availability;
pub mod booking;
pub mod error;
pub mod horizon;
pub mod rules;
pub mod slots;
pub mod time;

pub use availability::{
    check_booking, get_bookable_dates, get_open_slots, open_calendar, open_slots_on,
    BookingRequest, DayAvailability,
};
pub use booking::{filter_booked, Appointment, AppointmentStatus};
pub use error::EngineError;
pub use horizon::{scan_horizon, DEFAULT_HORIZON_DAYS, EXTENDED_HORIZON_DAYS};
pub use rules::{
    parse_stored_rules, resolve_rules, resolve_stored_rules, validate_rule, ScheduleSource,
    StoredRule, WeeklyAvailabilityRule, WeeklySchedule,
};
pub use slots::{generate_day_slots, generate_slots, SLOT_MINUTES};
pub use time::TimeOfDay;

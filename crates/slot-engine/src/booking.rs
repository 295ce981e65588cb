//! Existing appointments and the slots they occupy.
//!
//! Only `scheduled` and `confirmed` appointments block a slot. `completed` and
//! `cancelled` ones leave it open for re-booking, and an appointment whose
//! status is not one of the four known values is treated as non-blocking.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::time::TimeOfDay;

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether an appointment in this state occupies its slot.
    pub fn is_blocking(self) -> bool {
        match self {
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed => true,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is not one of the four known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown appointment status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// An appointment row as the data store returns it.
///
/// `time` stays as the stored string and is parsed when slots are filtered.
/// `status` is `None` when the stored value is missing or unrecognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub veterinarian_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<AppointmentStatus>,
}

impl Appointment {
    pub fn new(
        veterinarian_id: impl Into<String>,
        date: NaiveDate,
        time: TimeOfDay,
        status: AppointmentStatus,
    ) -> Self {
        Self {
            id: None,
            veterinarian_id: veterinarian_id.into(),
            pet_id: None,
            client_id: None,
            date,
            time: time.to_string(),
            status: Some(status),
        }
    }

    /// Whether this appointment removes its slot from availability.
    pub fn blocks_slot(&self) -> bool {
        self.status.is_some_and(AppointmentStatus::is_blocking)
    }

    /// The slot this appointment sits in, if its time parses.
    pub fn slot_time(&self) -> Option<TimeOfDay> {
        self.time.parse().ok()
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<AppointmentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            debug!("Treating appointment as non-blocking: {}", e);
            None
        }
    }))
}

/// Appointments of one veterinarian on one date.
pub fn appointments_on<'a>(
    appointments: &'a [Appointment],
    veterinarian_id: &'a str,
    date: NaiveDate,
) -> impl Iterator<Item = &'a Appointment> + 'a {
    appointments
        .iter()
        .filter(move |a| a.veterinarian_id == veterinarian_id && a.date == date)
}

/// Times occupied by blocking appointments.
///
/// Appointments whose time does not parse cannot occupy a slot; they are
/// skipped with a warning.
pub fn occupied_times<'a>(
    appointments: impl IntoIterator<Item = &'a Appointment>,
) -> HashSet<TimeOfDay> {
    appointments
        .into_iter()
        .filter(|a| a.blocks_slot())
        .filter_map(|a| match a.slot_time() {
            Some(t) => Some(t),
            None => {
                warn!(
                    "Ignoring appointment {:?} with unparseable time '{}'",
                    a.id, a.time
                );
                None
            }
        })
        .collect()
}

/// Remove slots occupied by blocking appointments, preserving order.
///
/// `appointments` must already be scoped to the same veterinarian and date as
/// `slots`; see [`appointments_on`].
pub fn filter_booked(slots: &[TimeOfDay], appointments: &[Appointment]) -> Vec<TimeOfDay> {
    let occupied = occupied_times(appointments);
    slots
        .iter()
        .copied()
        .filter(|slot| !occupied.contains(slot))
        .collect()
}

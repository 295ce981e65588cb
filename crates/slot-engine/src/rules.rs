//! Weekly availability rules and the effective schedule built from them.
//!
//! A veterinarian publishes recurring windows per weekday (`0` = Sunday ..
//! `6` = Saturday). A veterinarian with no stored windows gets the default
//! schedule, Monday to Friday 08:00-18:00, everywhere availability is computed.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::slots::SLOT_MINUTES;
use crate::time::TimeOfDay;

/// Opening time of the synthesized default schedule.
pub const DEFAULT_START: TimeOfDay = match TimeOfDay::from_hm(8, 0) {
    Some(t) => t,
    None => TimeOfDay::MIDNIGHT,
};

/// Closing time of the synthesized default schedule.
pub const DEFAULT_END: TimeOfDay = match TimeOfDay::from_hm(18, 0) {
    Some(t) => t,
    None => TimeOfDay::MIDNIGHT,
};

/// Weekdays covered by the default schedule.
pub const DEFAULT_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Sunday-first index used by the data store: `0` = Sunday .. `6` = Saturday.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Inverse of [`weekday_index`].
///
/// # Errors
/// Returns `EngineError::InvalidDayOfWeek` outside `0..=6`.
pub fn weekday_from_index(index: i64) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(EngineError::InvalidDayOfWeek(other)),
    }
}

/// A rule row as the data store returns it. Nothing is validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub veterinarian_id: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
}

/// A recurring weekly availability window for one veterinarian.
///
/// Serializes to and from the [`StoredRule`] row shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredRule", try_from = "StoredRule")]
pub struct WeeklyAvailabilityRule {
    pub id: Option<String>,
    pub veterinarian_id: String,
    pub day: Weekday,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl WeeklyAvailabilityRule {
    /// Build a rule covering `[start, end)` on `day`.
    ///
    /// # Errors
    /// Returns `EngineError::InvertedWindow` when `start >= end`.
    pub fn new(
        veterinarian_id: impl Into<String>,
        day: Weekday,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvertedWindow { start, end });
        }
        Ok(Self {
            id: None,
            veterinarian_id: veterinarian_id.into(),
            day,
            start,
            end,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sunday-first weekday index of this rule.
    pub fn day_of_week(&self) -> u8 {
        weekday_index(self.day)
    }

    /// Length of the window in minutes; zero for an inverted window.
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Whether `self` collides with `existing` on the same weekday.
    ///
    /// A collision is any of: `self.start` in `[existing.start, existing.end)`,
    /// `self.end` in `(existing.start, existing.end]`, or `self` containing
    /// `existing`. Back-to-back windows (one ends where the other starts) do
    /// not collide.
    pub fn overlaps(&self, existing: &WeeklyAvailabilityRule) -> bool {
        if self.day != existing.day {
            return false;
        }
        let start_inside = self.start >= existing.start && self.start < existing.end;
        let end_inside = self.end > existing.start && self.end <= existing.end;
        let contains = self.start <= existing.start && self.end >= existing.end;
        start_inside || end_inside || contains
    }

    fn is_same_row(&self, other: &WeeklyAvailabilityRule) -> bool {
        matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b)
    }
}

impl TryFrom<StoredRule> for WeeklyAvailabilityRule {
    type Error = EngineError;

    fn try_from(row: StoredRule) -> Result<Self> {
        let day = weekday_from_index(row.day_of_week)?;
        let start: TimeOfDay = row.start_time.parse()?;
        let end: TimeOfDay = row.end_time.parse()?;
        let rule = WeeklyAvailabilityRule::new(row.veterinarian_id, day, start, end)?;
        Ok(match row.id {
            Some(id) => rule.with_id(id),
            None => rule,
        })
    }
}

impl TryFrom<&StoredRule> for WeeklyAvailabilityRule {
    type Error = EngineError;

    fn try_from(row: &StoredRule) -> Result<Self> {
        WeeklyAvailabilityRule::try_from(row.clone())
    }
}

impl From<WeeklyAvailabilityRule> for StoredRule {
    fn from(rule: WeeklyAvailabilityRule) -> Self {
        StoredRule {
            id: rule.id,
            veterinarian_id: rule.veterinarian_id,
            day_of_week: i64::from(weekday_index(rule.day)),
            start_time: rule.start.to_string(),
            end_time: rule.end.to_string(),
        }
    }
}

/// Where the rules of a [`WeeklySchedule`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleSource {
    /// The veterinarian's own stored rules.
    Stored,
    /// The synthesized Monday-Friday 08:00-18:00 fallback.
    Default,
}

/// The effective weekly availability of one veterinarian, grouped by weekday.
///
/// Rules keep the order they were supplied in within each day. Slot
/// generation sorts them, so the schedule itself does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    veterinarian_id: String,
    days: [Vec<WeeklyAvailabilityRule>; 7],
    source: ScheduleSource,
}

impl WeeklySchedule {
    /// The default schedule: five rules, Monday to Friday, 08:00-18:00.
    pub fn default_for(veterinarian_id: &str) -> Self {
        let rules = DEFAULT_DAYS.iter().map(|&day| WeeklyAvailabilityRule {
            id: None,
            veterinarian_id: veterinarian_id.to_string(),
            day,
            start: DEFAULT_START,
            end: DEFAULT_END,
        });
        let mut schedule = Self::from_rules(veterinarian_id, rules);
        schedule.source = ScheduleSource::Default;
        schedule
    }

    /// Group `rules` by weekday without applying the default fallback.
    pub fn from_rules(
        veterinarian_id: &str,
        rules: impl IntoIterator<Item = WeeklyAvailabilityRule>,
    ) -> Self {
        let mut days: [Vec<WeeklyAvailabilityRule>; 7] = Default::default();
        for rule in rules {
            days[usize::from(weekday_index(rule.day))].push(rule);
        }
        Self {
            veterinarian_id: veterinarian_id.to_string(),
            days,
            source: ScheduleSource::Stored,
        }
    }

    pub fn veterinarian_id(&self) -> &str {
        &self.veterinarian_id
    }

    pub fn source(&self) -> ScheduleSource {
        self.source
    }

    /// Rules for one weekday, in the order they were supplied.
    pub fn rules_on(&self, day: Weekday) -> &[WeeklyAvailabilityRule] {
        &self.days[usize::from(weekday_index(day))]
    }

    /// Rules that apply to a calendar date.
    pub fn rules_for_date(&self, date: NaiveDate) -> &[WeeklyAvailabilityRule] {
        self.rules_on(date.weekday())
    }

    /// Whether at least one rule exists for `day`.
    pub fn has_rules_on(&self, day: Weekday) -> bool {
        !self.rules_on(day).is_empty()
    }

    /// All rules, Sunday first.
    pub fn rules(&self) -> impl Iterator<Item = &WeeklyAvailabilityRule> {
        self.days.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }
}

/// Resolve the effective schedule from a veterinarian's typed rules.
///
/// Non-empty input is returned unchanged, grouped by weekday. Empty input yields
/// the default schedule.
pub fn resolve_rules(veterinarian_id: &str, rules: &[WeeklyAvailabilityRule]) -> WeeklySchedule {
    if rules.is_empty() {
        debug!(
            "No availability stored for veterinarian {}, using default schedule",
            veterinarian_id
        );
        return WeeklySchedule::default_for(veterinarian_id);
    }
    WeeklySchedule::from_rules(veterinarian_id, rules.iter().cloned())
}

/// Parse raw store rows into rules, skipping malformed rows with a warning.
///
/// Only rows belonging to `veterinarian_id` are considered; rows of other
/// veterinarians are dropped. A row is malformed when a time does not parse,
/// the day index is outside `0..=6`, or its start is not before its end.
pub fn parse_stored_rules(
    veterinarian_id: &str,
    rows: &[StoredRule],
) -> Vec<WeeklyAvailabilityRule> {
    own_rows(veterinarian_id, rows)
        .filter_map(|row| match WeeklyAvailabilityRule::try_from(row) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(
                    "Skipping availability rule {:?} for veterinarian {}: {}",
                    row.id, veterinarian_id, e
                );
                None
            }
        })
        .collect()
}

/// Resolve the effective schedule from raw store rows.
///
/// Rows of other veterinarians are ignored, so a broad fetch can be passed as
/// is. Malformed rows are skipped (see [`parse_stored_rules`]) so the remaining
/// windows stay bookable. The default schedule applies only when the
/// veterinarian has no stored rows at all; if every stored row is malformed the
/// schedule is empty.
pub fn resolve_stored_rules(veterinarian_id: &str, rows: &[StoredRule]) -> WeeklySchedule {
    let stored = own_rows(veterinarian_id, rows).count();
    if stored == 0 {
        return resolve_rules(veterinarian_id, &[]);
    }

    let rules = parse_stored_rules(veterinarian_id, rows);
    if rules.is_empty() {
        warn!(
            "All {} stored availability rules for veterinarian {} are malformed",
            stored, veterinarian_id
        );
    }

    WeeklySchedule::from_rules(veterinarian_id, rules)
}

fn own_rows<'a>(
    veterinarian_id: &'a str,
    rows: &'a [StoredRule],
) -> impl Iterator<Item = &'a StoredRule> + 'a {
    rows.iter().filter(move |row| row.veterinarian_id == veterinarian_id)
}

/// Validate a new or edited rule before it is persisted.
///
/// Checks that the window is not inverted, that both ends sit on the 30-minute
/// slot grid, and that it does not overlap another rule of the same
/// veterinarian on the same weekday. When editing, an existing rule with the
/// same `id` as `candidate` is ignored.
///
/// # Errors
/// `InvertedWindow`, `OffGrid`, or `Overlap` naming the first conflicting rule.
pub fn validate_rule(
    existing: &[WeeklyAvailabilityRule],
    candidate: &WeeklyAvailabilityRule,
) -> Result<()> {
    if candidate.start >= candidate.end {
        return Err(EngineError::InvertedWindow {
            start: candidate.start,
            end: candidate.end,
        });
    }
    for t in [candidate.start, candidate.end] {
        if !t.is_on_grid(SLOT_MINUTES) {
            return Err(EngineError::OffGrid(t));
        }
    }

    let clash = existing
        .iter()
        .filter(|e| e.veterinarian_id == candidate.veterinarian_id)
        .filter(|e| !candidate.is_same_row(e))
        .find(|e| candidate.overlaps(e));

    match clash {
        Some(e) => Err(EngineError::Overlap {
            start: candidate.start,
            end: candidate.end,
            existing_start: e.start,
            existing_end: e.end,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_index_is_sunday_first() {
        assert_eq!(weekday_index(Weekday::Sun), 0);
        assert_eq!(weekday_index(Weekday::Mon), 1);
        assert_eq!(weekday_index(Weekday::Sat), 6);
        for i in 0..7 {
            assert_eq!(i64::from(weekday_index(weekday_from_index(i).unwrap())), i);
        }
    }

    #[test]
    fn day_index_out_of_range_is_rejected() {
        assert_eq!(
            weekday_from_index(7),
            Err(EngineError::InvalidDayOfWeek(7))
        );
        assert!(weekday_from_index(-1).is_err());
    }

    #[test]
    fn default_constants() {
        assert_eq!(DEFAULT_START.to_string(), "08:00");
        assert_eq!(DEFAULT_END.to_string(), "18:00");
    }
}

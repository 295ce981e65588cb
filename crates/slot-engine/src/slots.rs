//! Expand availability windows into bookable time labels.
//!
//! Each window `[start, end)` is cut into consecutive 30-minute slots on the
//! slot grid, beginning at the first grid mark at or after `start`. A slot is
//! only offered when it fits entirely inside the window, so a window shorter
//! than 30 minutes produces nothing.

use tracing::warn;

use crate::rules::WeeklyAvailabilityRule;
use crate::time::TimeOfDay;

/// Length of one bookable slot and the grid appointment times align to.
pub const SLOT_MINUTES: u16 = 30;

/// Slot start times for a single window, ascending.
///
/// An inverted window (`start >= end`) yields no slots. A start off the grid
/// is rounded up to the next grid mark.
pub fn generate_slots(rule: &WeeklyAvailabilityRule) -> Vec<TimeOfDay> {
    let start = rule.start.minutes();
    let end = rule.end.minutes();
    if start >= end {
        return Vec::new();
    }

    let first = start.div_ceil(SLOT_MINUTES) * SLOT_MINUTES;
    (first..end)
        .step_by(usize::from(SLOT_MINUTES))
        .take_while(|&minute| minute + SLOT_MINUTES <= end)
        .filter_map(TimeOfDay::from_minutes)
        .collect()
}

/// Slot start times for a whole day made of one or more windows.
///
/// Windows are sorted by start time before their slots are concatenated, and a
/// slot that does not advance past the previous one is dropped, so the result
/// is strictly ascending even if the input windows overlap. Inverted windows
/// are skipped with a warning.
pub fn generate_day_slots(rules: &[WeeklyAvailabilityRule]) -> Vec<TimeOfDay> {
    let mut windows: Vec<&WeeklyAvailabilityRule> = rules
        .iter()
        .filter(|rule| {
            if rule.start >= rule.end {
                warn!(
                    "Skipping inverted availability window {}-{} for veterinarian {}",
                    rule.start, rule.end, rule.veterinarian_id
                );
                return false;
            }
            true
        })
        .collect();

    if windows.is_empty() {
        return Vec::new();
    }

    // Sort by start time (then by end time for stability).
    windows.sort_by_key(|rule| (rule.start, rule.end));

    let mut slots: Vec<TimeOfDay> = Vec::new();
    for window in windows {
        for slot in generate_slots(window) {
            if slots.last().is_some_and(|&last| slot <= last) {
                continue;
            }
            slots.push(slot);
        }
    }

    slots
}

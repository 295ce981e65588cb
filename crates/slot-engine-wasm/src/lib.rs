//! WASM bindings for slot-engine.
//!
//! Exposes bookable-date scanning, open-slot computation, and the rule and
//! booking checks to the browser booking flow via `wasm-bindgen`, so every
//! screen calls the same engine. All complex types are passed as JSON strings:
//! rule and appointment rows in the shape the data store returns them, dates
//! as `YYYY-MM-DD`, times as `HH:MM`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slot_engine::{
    check_booking, get_open_slots, open_calendar, open_slots_on, parse_stored_rules,
    resolve_stored_rules, scan_horizon, validate_rule, Appointment, BookingRequest, StoredRule,
    WeeklyAvailabilityRule, WeeklySchedule,
};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct CheckDto {
    valid: bool,
}

/// Input format for a booking about to be submitted.
#[derive(Deserialize)]
struct BookingInput {
    date: String,
    time: String,
}

// ---------------------------------------------------------------------------
// Helpers: JSON in, JSON out. Errors are plain strings until the boundary.
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    s.parse::<NaiveDate>()
        .map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn parse_rows<T: for<'de> Deserialize<'de>>(json: &str, what: &str) -> Result<Vec<T>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn load_schedule(veterinarian_id: &str, rules_json: &str) -> Result<WeeklySchedule, String> {
    let rows: Vec<StoredRule> = parse_rows(rules_json, "rules")?;
    Ok(resolve_stored_rules(veterinarian_id, &rows))
}

fn bookable_dates_json(
    veterinarian_id: &str,
    rules_json: &str,
    today: &str,
    horizon_days: u32,
) -> Result<String, String> {
    let schedule = load_schedule(veterinarian_id, rules_json)?;
    let dates = scan_horizon(&schedule, parse_date(today)?, horizon_days);
    to_json(&dates)
}

fn open_slots_json(day_rules_json: &str, appointments_json: &str) -> Result<String, String> {
    let rows: Vec<StoredRule> = parse_rows(day_rules_json, "rules")?;
    let owner = rows.first().map(|r| r.veterinarian_id.as_str()).unwrap_or_default();
    let rules = parse_stored_rules(owner, &rows);
    let appointments: Vec<Appointment> = parse_rows(appointments_json, "appointments")?;
    to_json(&get_open_slots(&rules, &appointments))
}

fn open_slots_on_json(
    veterinarian_id: &str,
    rules_json: &str,
    appointments_json: &str,
    date: &str,
) -> Result<String, String> {
    let schedule = load_schedule(veterinarian_id, rules_json)?;
    let appointments: Vec<Appointment> = parse_rows(appointments_json, "appointments")?;
    to_json(&open_slots_on(&schedule, parse_date(date)?, &appointments))
}

fn open_calendar_json(
    veterinarian_id: &str,
    rules_json: &str,
    appointments_json: &str,
    today: &str,
    horizon_days: u32,
) -> Result<String, String> {
    let schedule = load_schedule(veterinarian_id, rules_json)?;
    let appointments: Vec<Appointment> = parse_rows(appointments_json, "appointments")?;
    let days = open_calendar(&schedule, &appointments, parse_date(today)?, horizon_days);
    to_json(&days)
}

fn validate_rule_json(existing_json: &str, candidate_json: &str) -> Result<String, String> {
    let candidate: StoredRule = serde_json::from_str(candidate_json)
        .map_err(|e| format!("Invalid rule JSON: {}", e))?;
    let candidate = WeeklyAvailabilityRule::try_from(candidate).map_err(|e| e.to_string())?;
    let rows: Vec<StoredRule> = parse_rows(existing_json, "rules")?;
    let existing = parse_stored_rules(&candidate.veterinarian_id, &rows);
    validate_rule(&existing, &candidate).map_err(|e| e.to_string())?;
    to_json(&CheckDto { valid: true })
}

fn check_booking_json(
    veterinarian_id: &str,
    rules_json: &str,
    appointments_json: &str,
    booking_json: &str,
) -> Result<String, String> {
    let schedule = load_schedule(veterinarian_id, rules_json)?;
    let appointments: Vec<Appointment> = parse_rows(appointments_json, "appointments")?;
    let input: BookingInput = serde_json::from_str(booking_json)
        .map_err(|e| format!("Invalid booking JSON: {}", e))?;
    let request = BookingRequest {
        veterinarian_id: veterinarian_id.to_string(),
        date: parse_date(&input.date)?,
        time: input.time.parse().map_err(|e: slot_engine::EngineError| e.to_string())?,
    };
    check_booking(&schedule, &appointments, &request).map_err(|e| e.to_string())?;
    to_json(&CheckDto { valid: true })
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Candidate booking dates for a veterinarian within the horizon.
///
/// `rules_json` is a JSON array of rule rows; rows of other veterinarians are
/// ignored and an empty set falls back to the Monday-Friday default. Returns a
/// JSON array of `YYYY-MM-DD` strings.
#[wasm_bindgen(js_name = "getBookableDates")]
pub fn get_bookable_dates(
    veterinarian_id: &str,
    rules_json: &str,
    today: &str,
    horizon_days: u32,
) -> Result<String, JsValue> {
    bookable_dates_json(veterinarian_id, rules_json, today, horizon_days)
        .map_err(|e| JsValue::from_str(&e))
}

/// Open slots from one day's rules and that day's appointments.
///
/// Both arguments must already be scoped to the chosen veterinarian and date.
/// Returns a JSON array of `HH:MM` strings.
#[wasm_bindgen(js_name = "getOpenSlots")]
pub fn get_open_slots_js(day_rules_json: &str, appointments_json: &str) -> Result<String, JsValue> {
    open_slots_json(day_rules_json, appointments_json).map_err(|e| JsValue::from_str(&e))
}

/// Open slots on `date`, scoping the rules and appointments itself.
#[wasm_bindgen(js_name = "getOpenSlotsOn")]
pub fn get_open_slots_on(
    veterinarian_id: &str,
    rules_json: &str,
    appointments_json: &str,
    date: &str,
) -> Result<String, JsValue> {
    open_slots_on_json(veterinarian_id, rules_json, appointments_json, date)
        .map_err(|e| JsValue::from_str(&e))
}

/// Dates in the horizon that still have open slots.
///
/// Returns a JSON array of `{date, slots}` objects.
#[wasm_bindgen(js_name = "openCalendar")]
pub fn open_calendar_js(
    veterinarian_id: &str,
    rules_json: &str,
    appointments_json: &str,
    today: &str,
    horizon_days: u32,
) -> Result<String, JsValue> {
    open_calendar_json(veterinarian_id, rules_json, appointments_json, today, horizon_days)
        .map_err(|e| JsValue::from_str(&e))
}

/// Validate a new or edited rule row against the veterinarian's stored rows.
///
/// Returns `{"valid":true}` or throws with the reason (inverted, off the
/// 30-minute grid, or overlapping).
#[wasm_bindgen(js_name = "validateRule")]
pub fn validate_rule_js(existing_json: &str, candidate_json: &str) -> Result<String, JsValue> {
    validate_rule_json(existing_json, candidate_json).map_err(|e| JsValue::from_str(&e))
}

/// Check a `{date, time}` booking right before it is inserted.
///
/// Returns `{"valid":true}` or throws with the reason.
#[wasm_bindgen(js_name = "checkBooking")]
pub fn check_booking_js(
    veterinarian_id: &str,
    rules_json: &str,
    appointments_json: &str,
    booking_json: &str,
) -> Result<String, JsValue> {
    check_booking_json(veterinarian_id, rules_json, appointments_json, booking_json)
        .map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"[
        {"veterinarian_id":"vet-1","day_of_week":1,"start_time":"09:00","end_time":"10:00"},
        {"veterinarian_id":"vet-2","day_of_week":2,"start_time":"09:00","end_time":"10:00"}
    ]"#;

    const APPOINTMENTS: &str = r#"[
        {"veterinarian_id":"vet-1","date":"2026-03-02","time":"09:00","status":"confirmed"}
    ]"#;

    #[test]
    fn bookable_dates_for_one_veterinarian() {
        let json = bookable_dates_json("vet-1", RULES, "2026-03-02", 14).unwrap();
        assert_eq!(json, r#"["2026-03-02","2026-03-09"]"#);
    }

    #[test]
    fn bookable_dates_rejects_bad_today() {
        let err = bookable_dates_json("vet-1", RULES, "03/02/2026", 14).unwrap_err();
        assert!(err.starts_with("Invalid date"), "{}", err);
    }

    #[test]
    fn open_slots_on_filters_booked() {
        let json = open_slots_on_json("vet-1", RULES, APPOINTMENTS, "2026-03-02").unwrap();
        assert_eq!(json, r#"["09:30"]"#);
    }

    #[test]
    fn open_slots_from_prescoped_inputs() {
        let day = r#"[{"veterinarian_id":"vet-1","day_of_week":1,"start_time":"09:00","end_time":"10:00"}]"#;
        assert_eq!(open_slots_json(day, APPOINTMENTS).unwrap(), r#"["09:30"]"#);
        assert_eq!(open_slots_json(day, "[]").unwrap(), r#"["09:00","09:30"]"#);
    }

    #[test]
    fn open_calendar_shape() {
        let json = open_calendar_json("vet-1", RULES, APPOINTMENTS, "2026-03-02", 8).unwrap();
        assert_eq!(
            json,
            r#"[{"date":"2026-03-02","slots":["09:30"]},{"date":"2026-03-09","slots":["09:00","09:30"]}]"#
        );
    }

    #[test]
    fn validate_rule_reports_overlap() {
        let candidate =
            r#"{"veterinarian_id":"vet-1","day_of_week":1,"start_time":"09:30","end_time":"10:30"}"#;
        let err = validate_rule_json(RULES, candidate).unwrap_err();
        assert!(err.contains("overlaps"), "{}", err);
    }

    #[test]
    fn validate_rule_accepts_free_window() {
        let candidate =
            r#"{"veterinarian_id":"vet-1","day_of_week":2,"start_time":"09:00","end_time":"10:00"}"#;
        assert_eq!(validate_rule_json(RULES, candidate).unwrap(), r#"{"valid":true}"#);
    }

    #[test]
    fn check_booking_reports_taken_slot() {
        let booking = r#"{"date":"2026-03-02","time":"09:00"}"#;
        let err = check_booking_json("vet-1", RULES, APPOINTMENTS, booking).unwrap_err();
        assert!(err.contains("already booked"), "{}", err);

        let booking = r#"{"date":"2026-03-02","time":"09:30"}"#;
        assert!(check_booking_json("vet-1", RULES, APPOINTMENTS, booking).is_ok());
    }
}

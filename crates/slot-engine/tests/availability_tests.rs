//! End-to-end tests for the booking flow: pick veterinarian, pick date, pick slot.

use chrono::{NaiveDate, Weekday};
use slot_engine::{
    check_booking, get_bookable_dates, get_open_slots, open_calendar, open_slots_on,
    resolve_rules, resolve_stored_rules, Appointment, AppointmentStatus, BookingRequest,
    EngineError, StoredRule, TimeOfDay, WeeklyAvailabilityRule,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn rule(day: Weekday, start: &str, end: &str) -> WeeklyAvailabilityRule {
    WeeklyAvailabilityRule::new("vet-1", day, t(start), t(end)).unwrap()
}

fn appt(date: NaiveDate, time: &str, status: AppointmentStatus) -> Appointment {
    Appointment::new("vet-1", date, t(time), status)
}

fn labels(slots: &[TimeOfDay]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

fn request(date: NaiveDate, time: &str) -> BookingRequest {
    BookingRequest {
        veterinarian_id: "vet-1".to_string(),
        date,
        time: t(time),
    }
}

#[test]
fn monday_only_veterinarian_end_to_end() {
    let rules = vec![rule(Weekday::Mon, "09:00", "10:00")];
    let monday = d(2026, 3, 2);

    let dates = get_bookable_dates("vet-1", &rules, monday, 14);
    assert_eq!(dates, vec![monday, d(2026, 3, 9)]);

    let schedule = resolve_rules("vet-1", &rules);
    let day_rules = schedule.rules_for_date(dates[0]);
    assert_eq!(labels(&get_open_slots(day_rules, &[])), ["09:00", "09:30"]);
}

#[test]
fn zero_rule_veterinarian_gets_weekday_dates() {
    let dates = get_bookable_dates("vet-1", &[], d(2026, 3, 2), 7);
    assert_eq!(
        dates,
        vec![d(2026, 3, 2), d(2026, 3, 3), d(2026, 3, 4), d(2026, 3, 5), d(2026, 3, 6)]
    );
}

#[test]
fn open_slots_on_scopes_a_broad_fetch() {
    let schedule = resolve_rules("vet-1", &[rule(Weekday::Mon, "09:00", "11:00")]);
    let monday = d(2026, 3, 2);
    let all = vec![
        appt(monday, "09:30", AppointmentStatus::Confirmed),
        appt(d(2026, 3, 9), "10:00", AppointmentStatus::Scheduled),
        Appointment::new("vet-2", monday, t("10:00"), AppointmentStatus::Scheduled),
    ];

    let slots = open_slots_on(&schedule, monday, &all);
    assert_eq!(labels(&slots), ["09:00", "10:00", "10:30"]);
}

#[test]
fn open_slots_on_day_without_rules_is_empty() {
    let schedule = resolve_rules("vet-1", &[rule(Weekday::Mon, "09:00", "11:00")]);
    assert!(open_slots_on(&schedule, d(2026, 3, 3), &[]).is_empty());
}

#[test]
fn lunch_break_day_offers_both_windows() {
    let schedule = resolve_rules(
        "vet-1",
        &[
            rule(Weekday::Fri, "13:00", "14:00"),
            rule(Weekday::Fri, "08:00", "09:00"),
        ],
    );
    let friday = d(2026, 3, 6);
    let booked = vec![appt(friday, "13:00", AppointmentStatus::Scheduled)];
    assert_eq!(
        labels(&open_slots_on(&schedule, friday, &booked)),
        ["08:00", "08:30", "13:30"]
    );
}

#[test]
fn candidate_date_can_be_fully_booked() {
    let rules = vec![rule(Weekday::Mon, "09:00", "10:00")];
    let monday = d(2026, 3, 2);
    let booked = vec![
        appt(monday, "09:00", AppointmentStatus::Scheduled),
        appt(monday, "09:30", AppointmentStatus::Confirmed),
    ];

    // Still a candidate date...
    assert!(get_bookable_dates("vet-1", &rules, monday, 14).contains(&monday));
    // ...but nothing left once the appointments are checked.
    let schedule = resolve_rules("vet-1", &rules);
    assert!(open_slots_on(&schedule, monday, &booked).is_empty());

    // The open calendar drops it.
    let calendar = open_calendar(&schedule, &booked, monday, 14);
    assert_eq!(calendar.len(), 1);
    assert_eq!(calendar[0].date, d(2026, 3, 9));
    assert_eq!(labels(&calendar[0].slots), ["09:00", "09:30"]);
}

#[test]
fn open_calendar_serializes_as_labels() {
    let schedule = resolve_rules("vet-1", &[rule(Weekday::Mon, "09:00", "09:30")]);
    let calendar = open_calendar(&schedule, &[], d(2026, 3, 2), 1);
    let json = serde_json::to_string(&calendar).unwrap();
    assert_eq!(json, r#"[{"date":"2026-03-02","slots":["09:00"]}]"#);
}

#[test]
fn booking_open_slot_passes() {
    let schedule = resolve_rules("vet-1", &[]);
    let monday = d(2026, 3, 2);
    let booked = vec![appt(monday, "09:00", AppointmentStatus::Cancelled)];
    assert_eq!(check_booking(&schedule, &booked, &request(monday, "09:00")), Ok(()));
}

#[test]
fn booking_taken_slot_fails() {
    let schedule = resolve_rules("vet-1", &[]);
    let monday = d(2026, 3, 2);
    let booked = vec![appt(monday, "09:00", AppointmentStatus::Scheduled)];
    assert_eq!(
        check_booking(&schedule, &booked, &request(monday, "09:00")),
        Err(EngineError::SlotTaken {
            date: monday,
            time: t("09:00")
        })
    );
}

#[test]
fn booking_outside_availability_fails() {
    let schedule = resolve_rules("vet-1", &[]);
    let saturday = d(2026, 3, 7);
    let monday = d(2026, 3, 2);

    assert!(matches!(
        check_booking(&schedule, &[], &request(saturday, "09:00")),
        Err(EngineError::OutsideAvailability { .. })
    ));
    // 18:00 is the closing time, not a slot.
    assert!(matches!(
        check_booking(&schedule, &[], &request(monday, "18:00")),
        Err(EngineError::OutsideAvailability { .. })
    ));
}

#[test]
fn booking_off_grid_fails() {
    let schedule = resolve_rules("vet-1", &[]);
    assert_eq!(
        check_booking(&schedule, &[], &request(d(2026, 3, 2), "09:10")),
        Err(EngineError::OffGrid(t("09:10")))
    );
}

#[test]
fn booking_for_another_veterinarian_fails() {
    let schedule = resolve_rules("vet-1", &[]);
    let mut other = request(d(2026, 3, 2), "09:00");
    other.veterinarian_id = "vet-2".to_string();

    assert_eq!(
        check_booking(&schedule, &[], &other),
        Err(EngineError::VeterinarianMismatch {
            requested: "vet-2".to_string(),
            schedule: "vet-1".to_string(),
        })
    );
}

#[test]
fn off_grid_stored_row_offers_only_bookable_slots() {
    let rows = vec![StoredRule {
        id: Some("r1".to_string()),
        veterinarian_id: "vet-1".to_string(),
        day_of_week: 1,
        start_time: "09:15".to_string(),
        end_time: "10:15".to_string(),
    }];
    let schedule = resolve_stored_rules("vet-1", &rows);
    let monday = d(2026, 3, 2);

    let slots = open_slots_on(&schedule, monday, &[]);
    assert_eq!(labels(&slots), ["09:30"]);
    for slot in slots {
        assert_eq!(check_booking(&schedule, &[], &request(monday, &slot.to_string())), Ok(()));
    }
}

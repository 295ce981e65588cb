//! Tests for `HH:MM` parsing, formatting, and serde shape.

use slot_engine::{EngineError, TimeOfDay};

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

#[test]
fn parses_and_formats_zero_padded() {
    assert_eq!(t("08:00").minutes(), 480);
    assert_eq!(t("18:30").to_string(), "18:30");
    assert_eq!(t("00:00"), TimeOfDay::MIDNIGHT);
}

#[test]
fn malformed_strings_are_rejected() {
    for bad in ["", "8", "08", "08:0", "08:000", "ab:cd", "25:00", "12:60", "-1:00", "08:00:00:00", "08h30"] {
        assert_eq!(
            bad.parse::<TimeOfDay>(),
            Err(EngineError::InvalidTime(bad.to_string())),
            "'{}' should not parse",
            bad
        );
    }
}

#[test]
fn ordering_follows_minutes() {
    assert!(t("09:00") < t("09:30"));
    assert!(t("23:30") < TimeOfDay::END_OF_DAY);
}

#[test]
fn grid_alignment() {
    assert!(t("09:00").is_on_grid(30));
    assert!(t("09:30").is_on_grid(30));
    assert!(!t("09:15").is_on_grid(30));
    assert!(!t("09:00").is_on_grid(0));
}

#[test]
fn checked_add_stops_at_end_of_day() {
    assert_eq!(t("23:30").checked_add_minutes(30), Some(TimeOfDay::END_OF_DAY));
    assert_eq!(t("23:30").checked_add_minutes(31), None);
}

#[test]
fn serializes_as_label_string() {
    let json = serde_json::to_string(&vec![t("08:00"), t("13:30")]).unwrap();
    assert_eq!(json, r#"["08:00","13:30"]"#);

    let back: Vec<TimeOfDay> = serde_json::from_str(r#"["08:00:00","13:30"]"#).unwrap();
    assert_eq!(back, vec![t("08:00"), t("13:30")]);

    assert!(serde_json::from_str::<TimeOfDay>(r#""noon""#).is_err());
}

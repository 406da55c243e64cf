//! Integration tests for NAV response parsing

use chrono::NaiveDate;
use navroll_data::{DataError, SchemeCode, parse_nav_response};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_newest_first_response_is_sorted() {
    let body = r#"{
        "meta": {"scheme_code": 119551, "scheme_name": "Example Bond Fund"},
        "data": [
            {"date": "03-06-2024", "nav": "12.10"},
            {"date": "31-05-2024", "nav": "12.00"},
            {"date": "02-05-2024", "nav": "11.95"},
            {"date": "30-04-2024", "nav": "11.90"}
        ]
    }"#;

    let nav = parse_nav_response(&SchemeCode::from("119551"), body).unwrap();
    let dates: Vec<_> = nav.history.points().iter().map(|p| p.date).collect();

    assert_eq!(
        dates,
        vec![
            date(2024, 4, 30),
            date(2024, 5, 2),
            date(2024, 5, 31),
            date(2024, 6, 3)
        ]
    );
    assert_eq!(nav.scheme_code.as_str(), "119551");
}

#[test]
fn test_month_end_lookup_on_parsed_history() {
    // 31-03-2024 was a Sunday; the last trading day is the 28th.
    let body = r#"{"data": [
        {"date": "01-04-2024", "nav": "20.5"},
        {"date": "28-03-2024", "nav": "20.0"},
        {"date": "27-03-2024", "nav": "19.9"}
    ]}"#;

    let nav = parse_nav_response(&SchemeCode::from("1"), body).unwrap();
    let point = nav.history.last_on_or_before(date(2024, 3, 31)).unwrap();

    assert_eq!(point.date, date(2024, 3, 28));
    assert_eq!(point.nav, 20.0);
}

#[test]
fn test_missing_data_names_scheme() {
    let err = parse_nav_response(&SchemeCode::from("999999"), r#"{"data": []}"#).unwrap_err();

    assert!(matches!(err, DataError::MissingData { .. }));
    assert!(err.to_string().contains("999999"));
}

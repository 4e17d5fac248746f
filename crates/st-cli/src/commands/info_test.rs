use super::*;
use chrono::{TimeZone, Utc};

#[test]
fn test_status_row_recorded() {
    let row = ScriptStatus {
        file_name: "1_init.json".to_string(),
        state: ScriptState::Applied,
        executed_at: Some(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()),
    };
    assert_eq!(
        status_row(&row),
        vec!["1_init.json", "applied", "2024-03-09 14:05:00"]
    );
}

#[test]
fn test_status_row_pending() {
    let row = ScriptStatus {
        file_name: "2_books.json".to_string(),
        state: ScriptState::Pending,
        executed_at: None,
    };
    assert_eq!(status_row(&row), vec!["2_books.json", "pending", "-"]);
}

use super::*;
use st_core::{compute_checksum, ExecutionRecord};
use st_ledger::MemoryLedger;

fn script(name: &str, content: &str) -> ScriptDescriptor {
    ScriptDescriptor {
        order_key: 0,
        relative_path: name.to_string(),
        content: content.as_bytes().to_vec(),
    }
}

fn record(id: &str, name: &str, content: &str, succeeded: bool) -> ExecutionRecord {
    ExecutionRecord {
        id: id.to_string(),
        file_name: name.to_string(),
        checksum: compute_checksum(content.as_bytes()),
        executed_at: Utc::now(),
        succeeded,
    }
}

fn states(rows: &[ScriptStatus]) -> Vec<(&str, ScriptState)> {
    rows.iter()
        .map(|r| (r.file_name.as_str(), r.state))
        .collect()
}

#[tokio::test]
async fn test_status_without_collection() {
    let ledger = MemoryLedger::new();
    let rows = status(&[script("1_a.json", "a")], &ledger).await.unwrap();
    assert_eq!(states(&rows), vec![("1_a.json", ScriptState::Pending)]);
    assert!(rows[0].executed_at.is_none());
    assert!(!ledger.collection_exists().await.unwrap());
}

#[tokio::test]
async fn test_status_reports_drift_without_failing() {
    let ledger = MemoryLedger::with_records(vec![
        record("1", "1_a.json", "a", true),
        record("2", "2_b.json", "b", true),
        record("3", "3_gone.json", "x", true),
        record("4", "4_d.json", "d", false),
    ]);
    let scripts = vec![
        script("1_a.json", "a"),
        script("2_b.json", "b edited"),
        script("4_d.json", "d"),
        script("5_e.json", "e"),
    ];

    let rows = status(&scripts, &ledger).await.unwrap();
    assert_eq!(
        states(&rows),
        vec![
            ("1_a.json", ScriptState::Applied),
            ("2_b.json", ScriptState::Changed),
            ("4_d.json", ScriptState::Failed),
            ("5_e.json", ScriptState::Pending),
            ("3_gone.json", ScriptState::Missing),
        ]
    );
}

#[tokio::test]
async fn test_status_serializes_snake_case() {
    let ledger = MemoryLedger::new();
    let rows = status(&[script("1_a.json", "a")], &ledger).await.unwrap();
    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["state"], "pending");
    assert!(json[0].get("executed_at").is_none());
    assert_eq!(ScriptState::Missing.to_string(), "missing");
}

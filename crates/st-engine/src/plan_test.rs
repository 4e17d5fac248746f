use super::*;
use chrono::Utc;
use st_core::compute_checksum;
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

fn pending_names(plan: &Plan<'_>) -> Vec<String> {
    plan.pending
        .iter()
        .map(|s| s.relative_path.clone())
        .collect()
}

#[tokio::test]
async fn test_plan_without_scripts_touches_nothing() {
    let ledger = MemoryLedger::new();
    let plan = plan(&[], &ledger).await.unwrap();
    assert!(plan.is_up_to_date());
    assert!(!ledger.collection_exists().await.unwrap());
}

#[tokio::test]
async fn test_plan_missing_collection_is_not_created() {
    let ledger = MemoryLedger::new();
    let scripts = vec![script("1_a.json", "a"), script("2_b.json", "b")];
    let plan = plan(&scripts, &ledger).await.unwrap();
    assert!(plan.fresh);
    assert_eq!(pending_names(&plan), vec!["1_a.json", "2_b.json"]);
    assert!(!ledger.collection_exists().await.unwrap());
}

#[tokio::test]
async fn test_plan_up_to_date() {
    let scripts = vec![script("1_a.json", "a"), script("2_b.json", "b")];
    let ledger = MemoryLedger::with_records(vec![
        record("1", "1_a.json", "a", true),
        record("2", "2_b.json", "b", true),
    ]);
    let plan = plan(&scripts, &ledger).await.unwrap();
    assert!(plan.is_up_to_date());
    assert_eq!(plan.applied, 2);
    assert!(!plan.fresh);
}

#[tokio::test]
async fn test_plan_retry_and_pending() {
    let scripts = vec![
        script("1_a.json", "a"),
        script("2_b.json", "b fixed"),
        script("3_c.json", "c"),
    ];
    let ledger = MemoryLedger::with_records(vec![
        record("1", "1_a.json", "a", true),
        record("2", "2_b.json", "b", false),
    ]);
    let plan = plan(&scripts, &ledger).await.unwrap();
    let retry = plan.retry.as_ref().unwrap();
    assert_eq!(retry.record.id, "2");
    assert_eq!(retry.script.content, b"b fixed");
    assert_eq!(plan.applied, 1);
    assert_eq!(pending_names(&plan), vec!["3_c.json"]);
}

#[tokio::test]
async fn test_plan_reports_violation() {
    let scripts = vec![script("1_a.json", "a")];
    let ledger = MemoryLedger::with_records(vec![record("1", "1_a.json", "changed", true)]);
    let err = plan(&scripts, &ledger).await.unwrap_err();
    assert!(matches!(err, EngineError::ChecksumMismatch { .. }));
}

/// Records written within the same millisecond, in the order a store that
/// breaks ties by name would return them
fn tied_records(failed_tail: bool) -> Vec<ExecutionRecord> {
    let at = Utc::now();
    let mut ten = record("2", "10_b.json", "b", !failed_tail);
    let mut nine = record("1", "9_a.json", "a", true);
    ten.executed_at = at;
    nine.executed_at = at;
    vec![ten, nine]
}

#[tokio::test]
async fn test_plan_tied_timestamps_follow_numeric_order() {
    let scripts = vec![
        script("9_a.json", "a"),
        script("10_b.json", "b"),
        script("11_c.json", "c"),
    ];
    let ledger = MemoryLedger::with_records(tied_records(false));

    let plan = plan(&scripts, &ledger).await.unwrap();
    assert!(plan.retry.is_none());
    assert_eq!(plan.applied, 2);
    assert_eq!(pending_names(&plan), vec!["11_c.json"]);
}

#[tokio::test]
async fn test_plan_tied_failed_tail_is_retried() {
    let scripts = vec![script("9_a.json", "a"), script("10_b.json", "b fixed")];
    // The store lists 9_a last, but 10_b ran after it
    let ledger = MemoryLedger::with_records(tied_records(true));

    let plan = plan(&scripts, &ledger).await.unwrap();
    let retry = plan.retry.as_ref().unwrap();
    assert_eq!(retry.record.file_name, "10_b.json");
    assert_eq!(plan.applied, 1);
    assert!(plan.pending.is_empty());
}

use super::*;
use chrono::Utc;
use st_core::{ExecutionRecord, ScriptDescriptor};
use st_engine::Retry;

fn script(name: &str) -> ScriptDescriptor {
    ScriptDescriptor {
        order_key: 1,
        relative_path: name.to_string(),
        content: b"{}".to_vec(),
    }
}

#[test]
fn test_summarize_up_to_date() {
    let plan = Plan {
        applied: 1,
        ..Plan::default()
    };
    assert_eq!(summarize(&plan), vec!["Ledger is up to date (1 script applied)"]);
}

#[test]
fn test_summarize_retry_and_pending() {
    let failed = script("2_books.json");
    let next = script("3_books.json");
    let record = ExecutionRecord {
        id: "abc".to_string(),
        file_name: failed.relative_path.clone(),
        checksum: failed.checksum(),
        executed_at: Utc::now(),
        succeeded: false,
    };
    let plan = Plan {
        retry: Some(Retry {
            record,
            script: &failed,
        }),
        pending: vec![&next],
        applied: 1,
        fresh: false,
    };

    assert_eq!(
        summarize(&plan),
        vec![
            "  retry    2_books.json",
            "  pending  3_books.json",
            "1 applied, 2 scripts to run",
        ]
    );
}

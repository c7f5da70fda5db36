use super::*;
use crate::test_utils::{write_unit, MemoryLedger, RecordingExecutor, SQL_BOOTSTRAP_MARKER};
use hop_ledger::DuckDbLedger;

fn bootstrap_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        write_unit(
            dir.path(),
            name,
            &format!("{SQL_BOOTSTRAP_MARKER}INSERT INTO t VALUES (1);\n"),
        );
    }
    dir
}

#[tokio::test]
async fn test_normal_mode_is_idempotent() {
    let dir = bootstrap_dir(&["2-b-0.1.0.sql", "1-a-0.1.0.sql"]);
    let executor = RecordingExecutor::new();
    let mut ledger = DuckDbLedger::open_memory().unwrap();

    let first = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await
        .unwrap();
    assert_eq!(first.executed, vec!["1-a-0.1.0.sql", "2-b-0.1.0.sql"]);
    assert!(first.skipped.is_empty());

    let second = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await
        .unwrap();
    assert!(second.executed.is_empty());
    assert_eq!(second.skipped, vec!["1-a-0.1.0.sql", "2-b-0.1.0.sql"]);
    assert_eq!(executor.executed().len(), 2);

    let record = ledger.get("1-a-0.1.0.sql").unwrap().unwrap();
    assert_eq!(record.origin_version, "0.1.0".parse::<hop_core::Version>().unwrap());
}

#[tokio::test]
async fn test_untagged_files_are_not_candidates() {
    let dir = bootstrap_dir(&["1-a-0.1.0.sql"]);
    write_unit(dir.path(), "2-plain-0.1.0.sql", "INSERT INTO t VALUES (2);\n");
    write_unit(dir.path(), "README.md", "# notes\n");
    let executor = RecordingExecutor::new();
    let mut ledger = MemoryLedger::new();

    let report = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await
        .unwrap();
    assert_eq!(report.executed, vec!["1-a-0.1.0.sql"]);
}

#[tokio::test]
async fn test_force_reruns_and_updates_timestamps() {
    let dir = bootstrap_dir(&["1-a-0.1.0.sql", "2-b-0.1.0.sql"]);
    let executor = RecordingExecutor::new();
    let mut ledger = DuckDbLedger::open_memory().unwrap();

    BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await
        .unwrap();
    let before = ledger.list().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let forced = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Force)
        .await
        .unwrap();
    assert_eq!(forced.executed, vec!["1-a-0.1.0.sql", "2-b-0.1.0.sql"]);
    assert_eq!(executor.executed().len(), 4);

    let after = ledger.list().unwrap();
    assert_eq!(after.len(), 2);
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.key, new.key);
        assert!(new.applied_at > old.applied_at);
    }
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = bootstrap_dir(&["1-a-0.1.0.sql", "2-b-0.1.0.sql"]);
    let executor = RecordingExecutor::new();
    let mut ledger = MemoryLedger::new();
    ledger.record("1-a-0.1.0.sql", "0.1.0".parse().unwrap()).unwrap();

    let report = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::DryRun)
        .await
        .unwrap();
    assert_eq!(report.would_run, vec!["2-b-0.1.0.sql"]);
    assert_eq!(report.skipped, vec!["1-a-0.1.0.sql"]);
    assert!(report.executed.is_empty());
    assert!(executor.executed().is_empty());
    assert_eq!(ledger.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_stops_run_and_keeps_prefix() {
    let dir = bootstrap_dir(&["1-a-0.1.0.sql", "2-b-0.1.0.sql", "3-c-0.1.0.sql"]);
    let executor = RecordingExecutor::failing_on("2-b-0.1.0.sql");
    let mut ledger = MemoryLedger::new();

    let report = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await
        .unwrap();
    assert!(!report.is_success());
    assert_eq!(report.executed, vec!["1-a-0.1.0.sql"]);
    assert_eq!(report.failed.as_ref().unwrap().unit, "2-b-0.1.0.sql");
    assert!(ledger.has("1-a-0.1.0.sql").unwrap());
    assert!(!ledger.has("2-b-0.1.0.sql").unwrap());
    assert!(!ledger.has("3-c-0.1.0.sql").unwrap());
}

#[tokio::test]
async fn test_record_failure_is_tracking_gap() {
    let dir = bootstrap_dir(&["1-a-0.1.0.sql", "2-b-0.1.0.sql"]);
    let executor = RecordingExecutor::new();
    let mut ledger = MemoryLedger::read_only();

    let report = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await
        .unwrap();
    assert_eq!(report.executed, vec!["1-a-0.1.0.sql"]);
    let failure = report.failed.unwrap();
    assert_eq!(failure.error.kind(), crate::error::ErrorKind::TrackingGap);
    assert_eq!(executor.executed(), vec!["1-a-0.1.0.sql"]);
}

#[tokio::test]
async fn test_duplicate_numbers_rejected_before_execution() {
    let dir = bootstrap_dir(&["1-a-0.1.0.sql", "1-b-0.1.0.sql"]);
    let executor = RecordingExecutor::new();
    let mut ledger = MemoryLedger::new();

    let result = BootstrapRunner::new(&executor, &mut ledger)
        .run(dir.path(), BootstrapMode::Normal)
        .await;
    assert!(result.is_err());
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn test_missing_directory_has_no_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let executor = RecordingExecutor::new();
    let mut ledger = MemoryLedger::new();

    let report = BootstrapRunner::new(&executor, &mut ledger)
        .run(&dir.path().join("bootstrap"), BootstrapMode::Normal)
        .await
        .unwrap();
    assert!(report.executed.is_empty() && report.skipped.is_empty());
}

//! Pipeline Contract: feed diff → report → persisted snapshot
//!
//! Verifies the end-to-end run semantics:
//! - A record newly present in the feed is reported as added and appears in
//!   the rendered report
//! - The persisted snapshot after a run equals the fresh fetch result
//! - The only-on-change gate skips dispatch but never skips persistence

mod common;

use common::*;
use credit_core::MonitorEngine;
use credit_core::model::CompanySnapshot;
use credit_core::state::MemorySnapshotStore;
use credit_core::traits::SnapshotStore;

#[tokio::test]
async fn added_record_is_detected_rendered_and_persisted() {
    let award_a = dormant_award("Riverside Tower", "DOC-1");
    let award_b = dormant_award("Harbor Bridge", "DOC-2");

    // Store remembers [A]; the feed now delivers [A, B].
    let store = MemorySnapshotStore::with_snapshot(CompanySnapshot {
        company_name: "Example Group".to_string(),
        awards: vec![award_a.clone()],
        ..Default::default()
    });

    let current = CompanySnapshot {
        company_name: "Example Group".to_string(),
        awards: vec![award_a, award_b],
        ..Default::default()
    };

    let source = ScriptedSource::new(encrypt_snapshot(&current));
    let notifier = RecordingNotifier::new();

    let (engine, _events) = MonitorEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        test_config(),
    )
    .expect("engine construction succeeds");

    let report = engine.run_once_at(run_date()).await.expect("run succeeds");

    assert_eq!(report.awards_added, 1);
    assert_eq!(report.awards_removed, 0);
    assert_eq!(report.penalties_added, 0);
    assert_eq!(report.penalties_removed, 0);

    // The novel record shows up in the delivered text
    let delivered = notifier.delivered().concat();
    assert!(delivered.contains("Harbor Bridge"));

    // The persisted snapshot is the fresh fetch result, wholesale
    let persisted = store.load().await.unwrap();
    assert_eq!(persisted, current);
    assert!(report.snapshot_saved);
}

#[tokio::test]
async fn first_run_reports_everything_as_added() {
    let current = CompanySnapshot {
        company_name: "Example Group".to_string(),
        awards: vec![
            dormant_award("Riverside Tower", "DOC-1"),
            dormant_award("Harbor Bridge", "DOC-2"),
        ],
        ..Default::default()
    };

    let store = MemorySnapshotStore::new();
    let source = ScriptedSource::new(encrypt_snapshot(&current));
    let notifier = RecordingNotifier::new();

    let (engine, _events) = MonitorEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        test_config(),
    )
    .unwrap();

    let report = engine.run_once_at(run_date()).await.unwrap();

    assert_eq!(report.awards_added, 2);
    assert_eq!(report.awards_removed, 0);
    assert!(report.chunks_sent > 0);
    assert_eq!(store.load().await.unwrap(), current);
}

#[tokio::test]
async fn quiet_run_with_gate_skips_dispatch_but_still_saves() {
    let award = dormant_award("Riverside Tower", "DOC-1");
    let unchanged = CompanySnapshot {
        company_name: "Example Group".to_string(),
        awards: vec![award],
        ..Default::default()
    };

    let store = MemorySnapshotStore::with_snapshot(unchanged.clone());
    let source = ScriptedSource::new(encrypt_snapshot(&unchanged));
    let notifier = RecordingNotifier::new();

    let mut config = test_config();
    config.report.only_on_change = true;

    let (engine, _events) = MonitorEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        config,
    )
    .unwrap();

    let report = engine.run_once_at(run_date()).await.unwrap();

    assert!(report.dispatch_skipped);
    assert_eq!(notifier.call_count(), 0);
    // Persistence is unconditional
    assert!(report.snapshot_saved);
    assert_eq!(store.load().await.unwrap(), unchanged);
}

#[tokio::test]
async fn without_gate_a_quiet_run_still_dispatches_the_full_report() {
    let unchanged = CompanySnapshot {
        company_name: "Example Group".to_string(),
        awards: vec![dormant_award("Riverside Tower", "DOC-1")],
        ..Default::default()
    };

    let store = MemorySnapshotStore::with_snapshot(unchanged.clone());
    let source = ScriptedSource::new(encrypt_snapshot(&unchanged));
    let notifier = RecordingNotifier::new();

    let (engine, _events) = MonitorEngine::new(
        Box::new(source),
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        test_config(),
    )
    .unwrap();

    let report = engine.run_once_at(run_date()).await.unwrap();

    assert!(!report.dispatch_skipped);
    assert!(report.chunks_sent > 0);
    let delivered = notifier.delivered().concat();
    assert!(delivered.contains("Riverside Tower"));
    assert!(delivered.contains("Qualification scores"));
}

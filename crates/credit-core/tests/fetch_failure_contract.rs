//! Abort Contract: fetch/decrypt/parse failures leave the world untouched
//!
//! A failed fetch or an undecryptable payload aborts the whole run: nothing
//! is rendered, nothing is dispatched, and the stored snapshot remains the
//! authoritative baseline for the next run.

mod common;

use common::*;
use credit_core::model::CompanySnapshot;
use credit_core::state::MemorySnapshotStore;
use credit_core::traits::{RecordSource, SnapshotStore};
use credit_core::{Decryptor, Error, MonitorEngine};

fn seeded_store() -> (MemorySnapshotStore, CompanySnapshot) {
    let baseline = CompanySnapshot {
        company_name: "Example Group".to_string(),
        awards: vec![dormant_award("Riverside Tower", "DOC-1")],
        ..Default::default()
    };
    (MemorySnapshotStore::with_snapshot(baseline.clone()), baseline)
}

async fn run_and_expect_abort(
    source: Box<dyn RecordSource>,
) -> (Error, RecordingNotifier, MemorySnapshotStore, CompanySnapshot) {
    let (store, baseline) = seeded_store();
    let notifier = RecordingNotifier::new();

    let (engine, _events) = MonitorEngine::new(
        source,
        Box::new(notifier.clone()),
        Box::new(store.clone()),
        test_config(),
    )
    .unwrap();

    let err = engine
        .run_once_at(run_date())
        .await
        .expect_err("run must abort");

    (err, notifier, store, baseline)
}

#[tokio::test]
async fn fetch_failure_aborts_the_run() {
    let (err, notifier, store, baseline) = run_and_expect_abort(Box::new(FailingSource)).await;

    assert!(matches!(err, Error::Source(_)));
    assert_eq!(notifier.call_count(), 0);
    assert_eq!(store.load().await.unwrap(), baseline);
}

#[tokio::test]
async fn undecryptable_payload_aborts_the_run() {
    let source = ScriptedSource::new("@@@ not base64 @@@".to_string());
    let (err, notifier, store, baseline) = run_and_expect_abort(Box::new(source)).await;

    assert!(matches!(err, Error::Decryption(_)));
    assert_eq!(notifier.call_count(), 0);
    assert_eq!(store.load().await.unwrap(), baseline);
}

#[tokio::test]
async fn payload_without_data_field_aborts_the_run() {
    // Decrypts fine, but the document lacks the top-level `data` field.
    let ciphertext = Decryptor::new(&test_cipher())
        .unwrap()
        .encrypt(br#"{"code":"0","msg":"ok"}"#);
    let source = ScriptedSource::new(ciphertext);
    let (err, notifier, store, baseline) = run_and_expect_abort(Box::new(source)).await;

    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(notifier.call_count(), 0);
    assert_eq!(store.load().await.unwrap(), baseline);
}

//! delete_all: ordering, progress and abort on first failure

use recsync_core::domain::{DomainError, Progress, Record, SyncStatus};
use recsync_sync::SyncError;

use crate::common::{self, MemoryStore, RecordingObserver};

#[tokio::test]
async fn test_deletes_every_record_in_order() {
    let store = MemoryStore::with_records(4);
    let observer = RecordingObserver::new();
    let mut engine = common::engine(store.clone(), observer.clone(), 10);
    let records = engine.fetch_all(&common::shape(&["name"])).await.unwrap();

    engine.delete_all(&common::class(), &records).await.unwrap();

    assert_eq!(store.deleted_ids(), vec!["r1", "r2", "r3", "r4"]);
    assert!(store.records().is_empty());
    assert_eq!(engine.state().status(), SyncStatus::Idle);
    assert!(engine.state().records().is_empty());
    assert_eq!(engine.state().progress(), Progress { current: 4, total: 4 });
}

#[tokio::test]
async fn test_progress_strictly_increases_one_to_n() {
    let store = MemoryStore::with_records(5);
    let observer = RecordingObserver::new();
    let mut engine = common::engine(store, observer.clone(), 10);
    let records = engine.fetch_all(&common::shape(&[])).await.unwrap();

    engine.delete_all(&common::class(), &records).await.unwrap();

    let currents: Vec<u64> = observer
        .progress_in(SyncStatus::Deleting)
        .iter()
        .map(|p| p.current)
        .collect();
    assert_eq!(currents, vec![0, 1, 2, 3, 4, 5]);
    assert!(observer
        .progress_in(SyncStatus::Deleting)
        .iter()
        .all(|p| p.total == 5));

    // each step drops the deleted record from the state
    let remaining: Vec<usize> = observer
        .states()
        .iter()
        .filter(|s| s.status() == SyncStatus::Deleting)
        .map(|s| s.records().len())
        .collect();
    assert_eq!(remaining, vec![5, 4, 3, 2, 1, 0]);
}

#[tokio::test]
async fn test_failure_on_kth_delete_aborts() {
    let store = MemoryStore::with_records(5);
    store.fail_delete_on(3);
    let observer = RecordingObserver::new();
    let mut engine = common::engine(store.clone(), observer.clone(), 10);
    let records = engine.fetch_all(&common::shape(&[])).await.unwrap();

    let err = engine.delete_all(&common::class(), &records).await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(_)));
    // two deletes applied, the third attempted, the rest never tried
    assert_eq!(store.deleted_ids(), vec!["r1", "r2", "r3"]);
    let left: Vec<String> = store.records().iter().map(|r| r.value("id")).collect();
    assert_eq!(left, vec!["r3", "r4", "r5"]);

    let state = engine.state();
    assert_eq!(state.status(), SyncStatus::Error);
    assert_eq!(state.progress(), Progress { current: 2, total: 5 });
    assert_eq!(state.records().len(), 3);
    assert!(state.error().unwrap_or_default().contains("Object not found"));
    assert_eq!(observer.status_path().last(), Some(&SyncStatus::Error));
}

#[tokio::test]
async fn test_record_without_id_fails_before_remote_calls() {
    let store = MemoryStore::with_records(2);
    let mut engine = common::engine(store.clone(), RecordingObserver::new(), 10);
    let mut records = engine.fetch_all(&common::shape(&[])).await.unwrap();
    records.push(Record::default());
    let calls_before = store.calls().len();

    let err = engine.delete_all(&common::class(), &records).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Domain(DomainError::MissingRecordId(_))
    ));
    assert_eq!(store.calls().len(), calls_before);
    assert_eq!(store.records().len(), 2);
    assert_eq!(engine.state().status(), SyncStatus::Error);
}

#[tokio::test]
async fn test_delete_nothing() {
    let store = MemoryStore::new();
    let mut engine = common::engine(store.clone(), RecordingObserver::new(), 10);

    engine.delete_all(&common::class(), &[]).await.unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(engine.state().status(), SyncStatus::Idle);
    assert_eq!(engine.state().progress(), Progress { current: 0, total: 0 });
}

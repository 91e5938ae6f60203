//! upload_all: field mapping, progress and abort on first failure

use recsync_core::domain::{Fields, Progress, SyncStatus};
use recsync_sync::SyncError;

use crate::common::{self, MemoryStore, RecordingObserver};

fn row(pairs: &[(&str, &str)]) -> Fields {
    pairs.iter().copied().collect()
}

#[tokio::test]
async fn test_id_column_is_renamed_other_names_pass() {
    let store = MemoryStore::new();
    let mut engine = common::engine(store.clone(), RecordingObserver::new(), 10);
    let rows = vec![row(&[("id", "42"), ("Id", "a"), ("firstName", "A"), ("ID ", "b")])];

    engine.upload_all(&common::class(), &rows).await.unwrap();

    let sent = store.saved_rows();
    let names: Vec<&str> = sent[0].names().collect();
    assert_eq!(names, vec!["ID", "Id", "firstName", "ID "]);
    assert_eq!(sent[0].get("ID"), Some("42"));
    assert!(!sent[0].contains("id"));
}

#[tokio::test]
async fn test_upload_saves_in_order_and_succeeds() {
    let store = MemoryStore::new();
    let observer = RecordingObserver::new();
    let mut engine = common::engine(store.clone(), observer.clone(), 10);
    let rows = vec![row(&[("name", "a")]), row(&[("name", "b")]), row(&[("name", "c")])];

    let saved = engine.upload_all(&common::class(), &rows).await.unwrap();

    let names: Vec<String> = saved.iter().map(|r| r.value("name")).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert!(saved.iter().all(|r| r.id().is_some()));

    let state = engine.state();
    assert_eq!(state.status(), SyncStatus::Success);
    assert_eq!(state.records(), saved.as_slice());
    assert_eq!(state.progress(), Progress { current: 3, total: 3 });

    let currents: Vec<u64> = observer
        .progress_in(SyncStatus::Updating)
        .iter()
        .map(|p| p.current)
        .collect();
    assert_eq!(currents, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_failure_on_kth_save_keeps_earlier_rows() {
    let store = MemoryStore::new();
    store.fail_save_on(2);
    let mut engine = common::engine(store.clone(), RecordingObserver::new(), 10);
    let rows = vec![row(&[("name", "a")]), row(&[("name", "b")]), row(&[("name", "c")])];

    let err = engine.upload_all(&common::class(), &rows).await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(ref m) if m.contains("invalid type")));
    assert_eq!(store.saved_rows().len(), 2);
    let kept: Vec<String> = store.records().iter().map(|r| r.value("name")).collect();
    assert_eq!(kept, vec!["a"]);

    assert_eq!(engine.state().status(), SyncStatus::Error);
    assert_eq!(engine.state().progress(), Progress { current: 1, total: 3 });
}

//! fetch_all: pagination, projection and failure behavior

use recsync_core::domain::{Progress, SyncStatus};

use crate::common::{self, MemoryStore, RecordingObserver};

#[tokio::test]
async fn test_page_counts_for_sizes_and_totals() {
    // (records, page size, expected query calls)
    let cases = [
        (0, 3, 1),
        (1, 3, 1),
        (2, 3, 1),
        (3, 3, 2),
        (4, 3, 2),
        (6, 3, 3),
        (7, 3, 3),
        (5, 1, 6),
        (10, 1000, 1),
    ];

    for (n, page_size, expected_calls) in cases {
        let store = MemoryStore::with_records(n);
        let observer = RecordingObserver::new();
        let mut engine = common::engine(store.clone(), observer, page_size);

        let records = engine.fetch_all(&common::shape(&["name"])).await.unwrap();

        assert_eq!(records.len(), n, "n={n} p={page_size}");
        assert_eq!(store.calls().len(), expected_calls, "n={n} p={page_size}");
        let expected_offsets: Vec<usize> = (0..expected_calls).map(|i| i * page_size).collect();
        assert_eq!(store.query_offsets(), expected_offsets);
    }
}

#[tokio::test]
async fn test_records_keep_store_order() {
    let store = MemoryStore::with_records(7);
    let mut engine = common::engine(store, RecordingObserver::new(), 3);

    let records = engine.fetch_all(&common::shape(&["name"])).await.unwrap();
    let ids: Vec<String> = records.iter().map(|r| r.value("id")).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3", "r4", "r5", "r6", "r7"]);
    assert_eq!(engine.state().records(), records.as_slice());
}

#[tokio::test]
async fn test_records_are_projected_onto_shape() {
    let store = MemoryStore::with_records(1);
    let mut engine = common::engine(store, RecordingObserver::new(), 10);

    let records = engine
        .fetch_all(&common::shape(&["missing", "name"]))
        .await
        .unwrap();

    let pairs: Vec<_> = records[0].fields().iter().collect();
    assert_eq!(pairs, vec![("missing", ""), ("name", "row1")]);
    assert_eq!(records[0].value("id"), "r1");
}

#[tokio::test]
async fn test_fetch_emits_loading_then_idle() {
    let store = MemoryStore::with_records(2);
    let observer = RecordingObserver::new();
    let mut engine = common::engine(store, observer.clone(), 10);

    engine.fetch_all(&common::shape(&[])).await.unwrap();

    assert_eq!(
        observer.status_path(),
        vec![SyncStatus::Loading, SyncStatus::Idle]
    );
    assert_eq!(engine.state().status(), SyncStatus::Idle);
    assert!(engine.state().error().is_none());
}

#[tokio::test]
async fn test_failed_page_keeps_last_committed_records() {
    let store = MemoryStore::with_records(5);
    let mut engine = common::engine(store.clone(), RecordingObserver::new(), 2);
    let shape = common::shape(&["name"]);

    let committed = engine.fetch_all(&shape).await.unwrap();
    // second fetch fails on its second page (fifth query overall)
    store.fail_query_on(5);

    let err = engine.fetch_all(&shape).await.unwrap_err();

    assert!(err.to_string().contains("connection reset"));
    assert_eq!(engine.state().status(), SyncStatus::Error);
    assert_eq!(engine.state().error(), Some(err.to_string().as_str()));
    assert_eq!(engine.state().records(), committed.as_slice());
    assert_eq!(engine.state().progress(), Progress::default());
}

#[tokio::test]
async fn test_fetch_after_error_recovers() {
    let store = MemoryStore::with_records(1);
    store.fail_query_on(1);
    let mut engine = common::engine(store, RecordingObserver::new(), 10);
    let shape = common::shape(&["name"]);

    assert!(engine.fetch_all(&shape).await.is_err());
    let records = engine.fetch_all(&shape).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(engine.state().status(), SyncStatus::Idle);
    assert!(engine.state().error().is_none());
}

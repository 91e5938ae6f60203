//! Shared test doubles: an in-memory record store and a recording observer

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use recsync_core::config::Config;
use recsync_core::domain::{
    ClassName, Fields, Progress, Record, RecordId, RecordShape, SyncState, SyncStatus,
};
use recsync_core::ports::{IRecordStore, ISyncObserver};
use recsync_sync::SyncEngine;

/// A call received by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query { limit: usize, offset: usize },
    Save(Fields),
    Delete(RecordId),
}

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    next_id: u64,
    calls: Vec<Call>,
    fail_query_on: Option<usize>,
    fail_save_on: Option<usize>,
    fail_delete_on: Option<usize>,
}

impl Inner {
    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

/// In-memory record store keeping records in insertion order
///
/// `fail_*_on(k)` makes the k-th call (1-based) of that kind fail.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store holding `n` records `r1..rn`, each with a `name` field
    pub fn with_records(n: usize) -> Arc<Self> {
        let store = Self::default();
        {
            let mut inner = store.inner.lock().unwrap();
            for i in 1..=n {
                let fields: Fields = [("name", format!("row{i}")), ("extra", "x".to_string())]
                    .into_iter()
                    .collect();
                let id = RecordId::new(format!("r{i}")).unwrap();
                inner.records.push(Record::new(fields).with_identity(id, None, None));
            }
        }
        Arc::new(store)
    }

    pub fn fail_query_on(&self, k: usize) {
        self.inner.lock().unwrap().fail_query_on = Some(k);
    }

    pub fn fail_save_on(&self, k: usize) {
        self.inner.lock().unwrap().fail_save_on = Some(k);
    }

    pub fn fail_delete_on(&self, k: usize) {
        self.inner.lock().unwrap().fail_delete_on = Some(k);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn query_offsets(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query { offset, .. } => Some(offset),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(id) => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn saved_rows(&self) -> Vec<Fields> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Save(fields) => Some(fields),
                _ => None,
            })
            .collect()
    }

    /// Records currently held
    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().records.clone()
    }
}

#[async_trait]
impl IRecordStore for MemoryStore {
    async fn query(
        &self,
        _class_name: &ClassName,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<Vec<Record>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Query { limit, offset });
        if inner.fail_query_on == Some(inner.count(|c| matches!(c, Call::Query { .. }))) {
            anyhow::bail!("connection reset");
        }
        Ok(inner.records.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn save(&self, _class_name: &ClassName, record: &Record) -> anyhow::Result<Record> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Save(record.fields().clone()));
        if inner.fail_save_on == Some(inner.count(|c| matches!(c, Call::Save(_)))) {
            anyhow::bail!("Store error 111: invalid type");
        }
        inner.next_id += 1;
        let id = RecordId::new(format!("n{}", inner.next_id))?;
        let now = Utc::now();
        let saved = record.clone().with_identity(id, Some(now), Some(now));
        inner.records.push(saved.clone());
        Ok(saved)
    }

    async fn delete(&self, _class_name: &ClassName, id: &RecordId) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Delete(id.clone()));
        if inner.fail_delete_on == Some(inner.count(|c| matches!(c, Call::Delete(_)))) {
            anyhow::bail!("Object not found.");
        }
        let before = inner.records.len();
        inner.records.retain(|r| r.id() != Some(id));
        if inner.records.len() == before {
            anyhow::bail!("Object not found.");
        }
        Ok(())
    }
}

/// Observer keeping a copy of every emitted state
#[derive(Default)]
pub struct RecordingObserver {
    states: Mutex<Vec<SyncState>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<SyncState> {
        self.states.lock().unwrap().clone()
    }

    /// Emitted statuses with consecutive repeats collapsed
    pub fn status_path(&self) -> Vec<SyncStatus> {
        let mut path: Vec<SyncStatus> = Vec::new();
        for state in self.states() {
            if path.last() != Some(&state.status()) {
                path.push(state.status());
            }
        }
        path
    }

    /// Progress of every emitted state with the given status
    pub fn progress_in(&self, status: SyncStatus) -> Vec<Progress> {
        self.states()
            .into_iter()
            .filter(|s| s.status() == status)
            .map(|s| s.progress())
            .collect()
    }
}

impl ISyncObserver for RecordingObserver {
    fn on_state(&self, state: &SyncState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

pub fn class() -> ClassName {
    ClassName::new("Customer".to_string()).unwrap()
}

pub fn shape(fields: &[&str]) -> RecordShape {
    RecordShape::new(class(), fields.iter().map(|s| s.to_string()).collect())
}

/// Engine over `store` with page size `page_size`, recording into `observer`
pub fn engine(
    store: Arc<MemoryStore>,
    observer: Arc<RecordingObserver>,
    page_size: usize,
) -> SyncEngine {
    SyncEngine::new(store, &Config::default())
        .with_page_size(page_size)
        .with_observer(observer)
}

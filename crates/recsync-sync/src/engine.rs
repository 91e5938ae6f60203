//! Record synchronization engine
//!
//! The [`SyncEngine`] drives the [`SyncState`] machine over a record store:
//! it pages through a class, deletes records one by one, uploads rows one by
//! one, and chains the three into the CSV replace workflow.
//!
//! ## Replace Flow
//!
//! 1. **Parse**: decode the CSV; a malformed row aborts before any remote call
//! 2. **Fetch**: page through the class to learn the existing records
//! 3. **Delete**: remove every existing record, in fetch order
//! 4. **Upload**: save every CSV row, in file order
//!
//! ## Failure Semantics
//!
//! The first failing remote call aborts the operation. Effects already
//! applied to the store stay applied; the state moves to `error` with the
//! failure message and the error is also returned. Nothing is retried here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use recsync_core::config::Config;
use recsync_core::domain::{
    ClassName, DomainError, Fields, Record, RecordId, RecordShape, SyncEvent, SyncState,
};
use recsync_core::ports::{IRecordStore, ISyncObserver, NoopObserver};

use crate::csv::CsvDocument;
use crate::SyncError;

// ============================================================================
// ReplaceSummary
// ============================================================================

/// Counts of a completed replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Records removed from the store
    pub deleted: usize,
    /// Rows saved to the store
    pub uploaded: usize,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Single-writer engine over one record store
///
/// Operations take `&mut self`, so one engine runs at most one operation at
/// a time. Every applied transition is handed to the observer.
pub struct SyncEngine {
    /// Remote record store
    store: Arc<dyn IRecordStore>,
    /// Receives every emitted state
    observer: Arc<dyn ISyncObserver>,
    /// Current state
    state: SyncState,
    /// Records requested per query
    page_size: usize,
}

impl SyncEngine {
    /// Creates a new `SyncEngine`
    ///
    /// # Arguments
    /// * `store` - Record store operations (IRecordStore)
    /// * `config` - Application configuration; `records.page_size` sets the page size
    pub fn new(store: Arc<dyn IRecordStore>, config: &Config) -> Self {
        Self {
            store,
            observer: Arc::new(NoopObserver),
            state: SyncState::new(),
            page_size: config.records.page_size.max(1),
        }
    }

    /// Overrides the query page size (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the observer receiving every emitted state
    pub fn with_observer(mut self, observer: Arc<dyn ISyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the latest state
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Returns the query page size
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Applies an event and notifies the observer
    fn emit(&mut self, event: SyncEvent) -> Result<(), SyncError> {
        self.state.apply(event)?;
        debug!(
            status = %self.state.status(),
            current = self.state.progress().current,
            total = self.state.progress().total,
            records = self.state.records().len(),
            "State changed"
        );
        self.observer.on_state(&self.state);
        Ok(())
    }

    /// Moves to `error` with the message of `err` and hands `err` back
    fn fail(&mut self, err: SyncError) -> SyncError {
        warn!(error = %err, status = %self.state.status(), "Sync operation failed");
        if let Err(e) = self.emit(SyncEvent::Failed(err.to_string())) {
            warn!(error = %e, "Could not record failure in sync state");
        }
        err
    }

    // ========================================================================
    // fetch_all
    // ========================================================================

    /// Fetches every record of the shape's class, page by page
    ///
    /// Pages are requested at offsets 0, P, 2P, ... until a page shorter than
    /// the page size P arrives. Records are projected onto the shape.
    ///
    /// # Returns
    /// The fetched records, also committed to the state
    #[tracing::instrument(skip(self, shape), fields(class = %shape.class_name()))]
    pub async fn fetch_all(&mut self, shape: &RecordShape) -> Result<Vec<Record>, SyncError> {
        self.emit(SyncEvent::FetchStarted)?;

        let class_name = shape.class_name();
        let mut records = Vec::new();
        let mut offset = 0;
        let mut pages = 0u32;

        loop {
            let page = match self.store.query(class_name, self.page_size, offset).await {
                Ok(page) => page,
                Err(e) => return Err(self.fail(SyncError::remote(e))),
            };
            pages += 1;

            let received = page.len();
            records.extend(page.into_iter().map(|record| record.project(shape)));
            debug!(offset, received, "Fetched page");

            if received < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        self.emit(SyncEvent::FetchSucceeded(records.clone()))?;
        info!(count = records.len(), pages, "Fetched all records");
        Ok(records)
    }

    // ========================================================================
    // delete_all
    // ========================================================================

    /// Deletes the given records one by one, in order
    ///
    /// Each successful delete advances the progress and drops the record from
    /// the state. Records without an id fail the whole operation before any
    /// remote call.
    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    pub async fn delete_all(
        &mut self,
        class_name: &ClassName,
        records: &[Record],
    ) -> Result<(), SyncError> {
        let ids = match collect_ids(class_name, records) {
            Ok(ids) => ids,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.emit(SyncEvent::DeleteStarted {
            total: ids.len() as u64,
        })?;

        for id in ids {
            if let Err(e) = self.store.delete(class_name, &id).await {
                return Err(self.fail(SyncError::remote(e)));
            }
            self.emit(SyncEvent::RecordDeleted(id))?;
        }

        self.emit(SyncEvent::DeleteSucceeded)?;
        info!(deleted = records.len(), "Deleted all records");
        Ok(())
    }

    // ========================================================================
    // upload_all
    // ========================================================================

    /// Saves each row as a new record, one by one, in order
    ///
    /// A column named `id` is stored as `ID`; other column names are kept.
    ///
    /// # Returns
    /// The saved records as returned by the store, also committed to the state
    #[tracing::instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn upload_all(
        &mut self,
        class_name: &ClassName,
        rows: &[Fields],
    ) -> Result<Vec<Record>, SyncError> {
        self.emit(SyncEvent::UploadStarted {
            total: rows.len() as u64,
        })?;

        let mut saved = Vec::with_capacity(rows.len());
        for row in rows {
            let record = Record::from_upload_row(row);
            match self.store.save(class_name, &record).await {
                Ok(record) => saved.push(record),
                Err(e) => return Err(self.fail(SyncError::remote(e))),
            }
            self.emit(SyncEvent::RecordSaved)?;
        }

        self.emit(SyncEvent::UploadSucceeded(saved.clone()))?;
        info!(uploaded = saved.len(), "Uploaded all rows");
        Ok(saved)
    }

    // ========================================================================
    // replace
    // ========================================================================

    /// Replaces every record of the class with the rows of a CSV document
    ///
    /// Not atomic: a failure after the delete phase started leaves the store
    /// with part of the old records or part of the new rows.
    #[tracing::instrument(skip(self, shape, csv_text), fields(class = %shape.class_name()))]
    pub async fn replace(
        &mut self,
        shape: &RecordShape,
        csv_text: &str,
    ) -> Result<ReplaceSummary, SyncError> {
        let document = match CsvDocument::parse(csv_text) {
            Ok(document) => document,
            Err(e) => return Err(self.fail(e.into())),
        };
        info!(rows = document.len(), "Parsed CSV");

        let existing = self.fetch_all(shape).await?;
        self.delete_all(shape.class_name(), &existing).await?;
        let saved = self.upload_all(shape.class_name(), document.rows()).await?;

        let summary = ReplaceSummary {
            deleted: existing.len(),
            uploaded: saved.len(),
        };
        info!(deleted = summary.deleted, uploaded = summary.uploaded, "Replace completed");
        Ok(summary)
    }
}

/// Ids of `records`, or the first record without one
fn collect_ids(class_name: &ClassName, records: &[Record]) -> Result<Vec<RecordId>, DomainError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record.id().cloned().ok_or_else(|| {
                DomainError::MissingRecordId(format!("{class_name} record #{}", index + 1))
            })
        })
        .collect()
}

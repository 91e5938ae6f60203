//! Record store port (driven/secondary port)
//!
//! This module defines the interface for reading and writing records of a
//! class in the remote object store. The primary implementation targets a
//! Parse Server through its REST API.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - Records are returned with every field the store holds; projection onto a
//!   [`RecordShape`](crate::domain::RecordShape) is the caller's concern.

use crate::domain::{ClassName, Record, RecordId};

/// Port trait for remote record storage
///
/// Implementations handle the store-specific API calls, session headers and
/// error mapping. None of the methods are retried by callers.
#[async_trait::async_trait]
pub trait IRecordStore: Send + Sync {
    /// Fetches one page of records
    ///
    /// # Arguments
    /// * `class_name` - Class to read
    /// * `limit` - Maximum number of records to return
    /// * `offset` - Number of records to skip, in the store's natural order
    ///
    /// # Returns
    /// Up to `limit` records; fewer means the end of the class was reached
    async fn query(
        &self,
        class_name: &ClassName,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<Vec<Record>>;

    /// Creates a record, or updates it when it already has an id
    ///
    /// # Arguments
    /// * `class_name` - Class the record belongs to
    /// * `record` - Record to persist
    ///
    /// # Returns
    /// The persisted record carrying its id and timestamps
    async fn save(&self, class_name: &ClassName, record: &Record) -> anyhow::Result<Record>;

    /// Deletes a record by id
    ///
    /// # Arguments
    /// * `class_name` - Class the record belongs to
    /// * `id` - Identity of the record to delete
    ///
    /// # Errors
    /// Fails when the record does not exist or the store is unreachable
    async fn delete(&self, class_name: &ClassName, id: &RecordId) -> anyhow::Result<()>;
}

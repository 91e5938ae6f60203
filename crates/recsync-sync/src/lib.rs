//! recsync Sync - Record synchronization engine
//!
//! Provides:
//! - Paginated fetch of every record in a class
//! - Sequential bulk delete and bulk upload with progress
//! - The CSV-driven replace workflow
//! - CSV decoding and encoding
//!
//! ## Modules
//!
//! - [`engine`] - Sync engine driving the state machine over a record store
//! - [`csv`] - CSV document adapter

pub mod csv;
pub mod engine;

use thiserror::Error;

use recsync_core::domain::DomainError;

pub use crate::csv::{CsvDocument, CsvError};
pub use crate::engine::{ReplaceSummary, SyncEngine};

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store failed; the message keeps the full cause chain
    #[error("Remote store error: {0}")]
    Remote(String),

    /// The CSV input is malformed
    #[error("CSV error: {0}")]
    Parse(#[from] CsvError),

    /// A domain-level error propagated from recsync-core
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl SyncError {
    /// Wraps a port error, keeping its context chain in the message
    pub fn remote(err: anyhow::Error) -> Self {
        SyncError::Remote(format!("{err:#}"))
    }
}

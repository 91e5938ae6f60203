//! SyncState domain entity
//!
//! Tracks the status, records, error and progress of the record
//! synchronization workflow. The only way to change a [`SyncState`] is
//! [`SyncState::apply`], which validates a [`SyncEvent`] against the
//! current status before mutating anything.
//!
//! ## State machine
//!
//! ```text
//! idle|error|success --FetchStarted--> loading --FetchSucceeded--> idle
//! idle|error|success --DeleteStarted-> deleting --DeleteSucceeded--> idle
//! idle|error|success --UploadStarted-> updating --UploadSucceeded--> success
//! any --Failed--> error
//! ```
//!
//! Effects already applied to the remote store before a failure are not
//! rolled back; the state only records how far the operation got.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::RecordId;
use super::record::Record;

/// Status of the synchronization workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Nothing running; records reflect the last committed fetch or delete
    #[default]
    Idle,
    /// Fetching all records page by page
    Loading,
    /// Deleting records one by one
    Deleting,
    /// Saving uploaded rows one by one
    Updating,
    /// An upload completed
    Success,
    /// The last operation failed; see [`SyncState::error`]
    Error,
}

impl SyncStatus {
    /// Lowercase name used in logs and messages
    pub fn name(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Loading => "loading",
            SyncStatus::Deleting => "deleting",
            SyncStatus::Updating => "updating",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        }
    }

    /// Returns true while an operation is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SyncStatus::Loading | SyncStatus::Deleting | SyncStatus::Updating
        )
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `(current, total)` completion counter of the running delete or upload phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Items completed so far
    pub current: u64,
    /// Items in the phase
    pub total: u64,
}

impl Progress {
    /// Creates a counter at zero for `total` items
    pub fn start(total: u64) -> Self {
        Self { current: 0, total }
    }

    /// Completion percentage (0.0 to 100.0); an empty phase counts as done
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current as f64 / self.total as f64) * 100.0
    }

    /// Returns true when every item is done
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.current, self.total)
    }
}

/// Inputs to the transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A fetch of all records began
    FetchStarted,
    /// All pages were fetched
    FetchSucceeded(Vec<Record>),
    /// A bulk delete of `total` records began
    DeleteStarted {
        /// Number of records to delete
        total: u64,
    },
    /// One record was deleted remotely
    RecordDeleted(RecordId),
    /// Every record of the bulk delete is gone
    DeleteSucceeded,
    /// An upload of `total` rows began
    UploadStarted {
        /// Number of rows to save
        total: u64,
    },
    /// One row was saved remotely
    RecordSaved,
    /// Every row was saved; carries the saved records
    UploadSucceeded(Vec<Record>),
    /// The running operation (or the CSV parse preceding it) failed
    Failed(String),
}

impl SyncEvent {
    /// Name of the status this event leads to
    fn target(&self) -> SyncStatus {
        match self {
            SyncEvent::FetchStarted => SyncStatus::Loading,
            SyncEvent::FetchSucceeded(_) => SyncStatus::Idle,
            SyncEvent::DeleteStarted { .. } | SyncEvent::RecordDeleted(_) => SyncStatus::Deleting,
            SyncEvent::DeleteSucceeded => SyncStatus::Idle,
            SyncEvent::UploadStarted { .. } | SyncEvent::RecordSaved => SyncStatus::Updating,
            SyncEvent::UploadSucceeded(_) => SyncStatus::Success,
            SyncEvent::Failed(_) => SyncStatus::Error,
        }
    }
}

/// Observable state of one synchronization view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    status: SyncStatus,
    records: Vec<Record>,
    error: Option<String>,
    progress: Progress,
}

impl SyncState {
    /// Creates an idle state with no records
    pub fn new() -> Self {
        Self::default()
    }

    // --- Getters ---

    /// Returns the current status
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Returns the committed records in fetch or upload order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the message of the last failure, if the status is `error`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the progress of the running (or last) delete/upload phase
    pub fn progress(&self) -> Progress {
        self.progress
    }

    // --- Transition function ---

    /// Returns true if `event` is allowed from the current status
    pub fn can_apply(&self, event: &SyncEvent) -> bool {
        let startable = matches!(
            self.status,
            SyncStatus::Idle | SyncStatus::Error | SyncStatus::Success
        );

        match event {
            SyncEvent::FetchStarted
            | SyncEvent::DeleteStarted { .. }
            | SyncEvent::UploadStarted { .. } => startable,
            SyncEvent::FetchSucceeded(_) => self.status == SyncStatus::Loading,
            SyncEvent::RecordDeleted(_) => {
                self.status == SyncStatus::Deleting && !self.progress.is_complete()
            }
            SyncEvent::DeleteSucceeded => self.status == SyncStatus::Deleting,
            SyncEvent::RecordSaved => {
                self.status == SyncStatus::Updating && !self.progress.is_complete()
            }
            SyncEvent::UploadSucceeded(_) => self.status == SyncStatus::Updating,
            SyncEvent::Failed(_) => true,
        }
    }

    /// Applies one event
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` and leaves the state untouched if
    /// the event is not allowed from the current status.
    pub fn apply(&mut self, event: SyncEvent) -> Result<(), DomainError> {
        if !self.can_apply(&event) {
            return Err(DomainError::InvalidState {
                from: self.status.name().to_string(),
                to: event.target().name().to_string(),
            });
        }

        match event {
            SyncEvent::FetchStarted => {
                self.status = SyncStatus::Loading;
                self.error = None;
            }
            SyncEvent::FetchSucceeded(records) => {
                self.status = SyncStatus::Idle;
                self.records = records;
            }
            SyncEvent::DeleteStarted { total } => {
                self.status = SyncStatus::Deleting;
                self.error = None;
                self.progress = Progress::start(total);
            }
            SyncEvent::RecordDeleted(id) => {
                self.progress.current += 1;
                if let Some(pos) = self.records.iter().position(|r| r.id() == Some(&id)) {
                    self.records.remove(pos);
                }
            }
            SyncEvent::DeleteSucceeded => {
                self.status = SyncStatus::Idle;
            }
            SyncEvent::UploadStarted { total } => {
                self.status = SyncStatus::Updating;
                self.error = None;
                self.progress = Progress::start(total);
            }
            SyncEvent::RecordSaved => {
                self.progress.current += 1;
            }
            SyncEvent::UploadSucceeded(records) => {
                self.status = SyncStatus::Success;
                self.records = records;
            }
            SyncEvent::Failed(message) => {
                self.status = SyncStatus::Error;
                self.error = Some(message);
            }
        }

        Ok(())
    }
}

//! Domain entities and business logic
//!
//! This module contains the core domain types for recsync:
//! - Newtypes for validated store identifiers
//! - Records, field bags and record shapes
//! - The operator session
//! - The synchronization state machine
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod record;
pub mod session;
pub mod sync_state;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
pub use record::{
    format_timestamp, Fields, Record, RecordShape, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
    UPLOADED_ID_FIELD,
};
pub use session::Session;
pub use sync_state::{Progress, SyncEvent, SyncState, SyncStatus};

//! Integration tests for recsync-sync
//!
//! Runs the SyncEngine against an in-memory record store with failure
//! injection and checks the emitted states and the store calls.

mod common;

mod test_delete;
mod test_fetch;
mod test_upload;

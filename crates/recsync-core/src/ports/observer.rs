//! Sync observer port (driving side)
//!
//! The sync engine hands every state it emits to an [`ISyncObserver`], in
//! order and synchronously, so observers see each progress step.

use crate::domain::SyncState;

/// Receives the states emitted by the sync engine
pub trait ISyncObserver: Send + Sync {
    /// Called after every applied transition
    fn on_state(&self, state: &SyncState);
}

/// Observer that ignores every state
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ISyncObserver for NoopObserver {
    fn on_state(&self, _state: &SyncState) {}
}

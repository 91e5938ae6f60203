//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and invalid state transitions.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid class name for the remote store
    #[error("Invalid class name: {0}")]
    InvalidClassName(String),

    /// Invalid record identifier
    #[error("Invalid record ID: {0}")]
    InvalidRecordId(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },

    /// A record that must already exist in the store has no identity
    #[error("Record has no ID: {0}")]
    MissingRecordId(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

//! recsync Parse - Parse Server REST client
//!
//! Provides async client for:
//! - Record queries, saves and deletes on a class (`/classes/{class}`)
//! - Login, logout and session validation (`/login`, `/logout`, `/users/me`)
//! - Cloud function calls (`/functions/{name}`)
//! - Session persistence in the system keyring
//!
//! ## Modules
//!
//! - [`auth`] - Login/logout adapter and keyring session storage
//! - [`client`] - Parse REST HTTP client with 429 retry
//! - [`functions`] - Cloud function invocation
//! - [`provider`] - [`IRecordStore`](recsync_core::ports::IRecordStore) implementation

pub mod auth;
pub mod client;
pub mod functions;
pub mod provider;

use std::time::Duration;
use thiserror::Error;

/// Parse error code for a missing object (also returned on bad credentials)
pub const CODE_OBJECT_NOT_FOUND: i64 = 101;

/// Parse error code for an invalid or revoked session token
pub const CODE_INVALID_SESSION_TOKEN: i64 = 209;

/// Errors that can occur when communicating with a Parse Server
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server refused the request credentials (HTTP 401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Username or password were rejected at login
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The session token is invalid, expired or revoked
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// The requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded and retries exhausted
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration the server asked to wait
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other error reported by the server
    #[error("Store error {code}: {message}")]
    Store {
        /// Parse error code
        code: i64,
        /// Message reported by the server
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Returns true if the error means the session must be renewed
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            StoreError::Unauthorized(_)
                | StoreError::InvalidSession(_)
                | StoreError::InvalidCredentials(_)
        )
    }
}

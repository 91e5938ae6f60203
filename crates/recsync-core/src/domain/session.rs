//! Session domain entity
//!
//! An authenticated operator session with the remote store's user service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated user session
///
/// The session token is sent with every store request made on behalf of
/// the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Store identity of the logged-in user
    pub user_id: String,
    /// Login name
    pub username: String,
    /// Opaque token identifying the session on the server
    pub session_token: String,
    /// When the session was opened locally
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session opened now
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            session_token: session_token.into(),
            logged_in_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.username, self.user_id)
    }
}

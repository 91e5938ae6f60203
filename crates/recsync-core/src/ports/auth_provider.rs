//! Authentication ports
//!
//! [`IAuthProvider`] talks to the remote user service; [`ISessionStore`]
//! keeps the resulting [`Session`] between CLI invocations.

use crate::domain::Session;

/// Port trait for the remote user service
#[async_trait::async_trait]
pub trait IAuthProvider: Send + Sync {
    /// Logs in with username and password
    ///
    /// # Returns
    /// A new session carrying the server-issued session token
    ///
    /// # Errors
    /// Fails with an authentication error on bad credentials
    async fn log_in(&self, username: &str, password: &str) -> anyhow::Result<Session>;

    /// Invalidates the session on the server
    async fn log_out(&self, session: &Session) -> anyhow::Result<()>;

    /// Validates a session and returns the user it belongs to
    async fn current_user(&self, session: &Session) -> anyhow::Result<Session>;
}

/// Port trait for local session persistence
pub trait ISessionStore: Send + Sync {
    /// Returns the stored session, if any
    fn load(&self) -> anyhow::Result<Option<Session>>;

    /// Stores the session, replacing any previous one
    fn store(&self, session: &Session) -> anyhow::Result<()>;

    /// Removes the stored session; succeeds when none is stored
    fn clear(&self) -> anyhow::Result<()>;
}

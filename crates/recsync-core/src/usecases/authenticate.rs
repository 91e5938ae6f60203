//! Authentication use case
//!
//! Orchestrates login, logout and session status against the remote user
//! service. Delegates the remote calls to the auth provider port and session
//! persistence to the session store port.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    domain::Session,
    ports::{IAuthProvider, ISessionStore},
};

/// Use case for authentication operations
pub struct AuthenticateUseCase {
    auth_provider: Arc<dyn IAuthProvider>,
    session_store: Arc<dyn ISessionStore>,
}

impl AuthenticateUseCase {
    /// Creates a new AuthenticateUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `auth_provider` - Remote user service
    /// * `session_store` - Local persistence for the session
    pub fn new(auth_provider: Arc<dyn IAuthProvider>, session_store: Arc<dyn ISessionStore>) -> Self {
        Self {
            auth_provider,
            session_store,
        }
    }

    /// Logs in and persists the new session
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session
    /// cannot be stored. A rejected login leaves any stored session intact.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let session = self
            .auth_provider
            .log_in(username, password)
            .await
            .context("Login failed")?;

        self.session_store
            .store(&session)
            .context("Failed to persist session")?;

        info!(user = %session.username, "Logged in");
        Ok(session)
    }

    /// Logs out the stored session
    ///
    /// The local session is cleared even when the server refuses the logout
    /// (for example because the token already expired).
    ///
    /// # Returns
    ///
    /// The session that was logged out, or None if nobody was logged in
    pub async fn logout(&self) -> Result<Option<Session>> {
        let Some(session) = self
            .session_store
            .load()
            .context("Failed to read stored session")?
        else {
            return Ok(None);
        };

        if let Err(e) = self.auth_provider.log_out(&session).await {
            warn!(user = %session.username, error = %e, "Server-side logout failed");
        }

        self.session_store
            .clear()
            .context("Failed to clear stored session")?;

        info!(user = %session.username, "Logged out");
        Ok(Some(session))
    }

    /// Returns the stored session after validating it with the server
    ///
    /// # Returns
    ///
    /// The validated session, or None if nobody is logged in
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the stored session
    pub async fn status(&self) -> Result<Option<Session>> {
        let Some(session) = self
            .session_store
            .load()
            .context("Failed to read stored session")?
        else {
            return Ok(None);
        };

        let current = self
            .auth_provider
            .current_user(&session)
            .await
            .context("Stored session is no longer valid")?;

        Ok(Some(current))
    }

    /// Returns the stored session without contacting the server
    pub fn stored_session(&self) -> Result<Option<Session>> {
        self.session_store
            .load()
            .context("Failed to read stored session")
    }
}

//! Authentication against the Parse user service
//!
//! Provides the components for operator sessions:
//! - [`ParseAuthAdapter`] - `IAuthProvider` over `/login`, `/logout`, `/users/me`
//! - [`KeyringSessionStorage`] - `ISessionStore` backed by the system keyring

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use recsync_core::domain::Session;
use recsync_core::ports::{IAuthProvider, ISessionStore};

use crate::client::ParseClient;
use crate::StoreError;

/// Keyring service name for storing sessions
const KEYRING_SERVICE: &str = "recsync";

/// Header asking the server for a revocable session token
const HEADER_REVOCABLE_SESSION: &str = "X-Parse-Revocable-Session";

// ============================================================================
// Parse REST response types
// ============================================================================

/// Response of `POST /login`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    object_id: String,
    username: String,
    session_token: String,
}

/// Response of `GET /users/me`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    object_id: String,
    username: String,
}

// ============================================================================
// ParseAuthAdapter
// ============================================================================

/// Authentication adapter for the Parse user service
pub struct ParseAuthAdapter {
    client: ParseClient,
}

impl ParseAuthAdapter {
    /// Creates a new adapter; the client's own session token is not used
    pub fn new(client: ParseClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IAuthProvider for ParseAuthAdapter {
    async fn log_in(&self, username: &str, password: &str) -> Result<Session> {
        debug!(username, "Logging in");
        let body = json!({ "username": username, "password": password });

        let response: LoginResponse = self
            .client
            .send_json(Method::POST, "/login", |rb| {
                rb.header(HEADER_REVOCABLE_SESSION, "1").json(&body)
            })
            .await
            .map_err(|e| match e {
                StoreError::NotFound(message) => StoreError::InvalidCredentials(message),
                other => other,
            })
            .context("Failed to log in")?;

        info!(username = %response.username, "Login succeeded");
        Ok(Session::new(
            response.object_id,
            response.username,
            response.session_token,
        ))
    }

    async fn log_out(&self, session: &Session) -> Result<()> {
        let client = self.client.clone().with_session_token(&session.session_token);

        let _: Value = client
            .send_json(Method::POST, "/logout", |rb| rb)
            .await
            .context("Failed to log out")?;

        info!(username = %session.username, "Session revoked on server");
        Ok(())
    }

    async fn current_user(&self, session: &Session) -> Result<Session> {
        let client = self.client.clone().with_session_token(&session.session_token);

        let me: MeResponse = client
            .send_json(Method::GET, "/users/me", |rb| rb)
            .await
            .context("Failed to validate session")?;

        Ok(Session {
            user_id: me.object_id,
            username: me.username,
            ..session.clone()
        })
    }
}

// ============================================================================
// KeyringSessionStorage
// ============================================================================

/// Stores the operator session in the system keyring
///
/// Uses the `keyring` crate to store the session securely in the OS
/// credential store (e.g., GNOME Keyring, KDE Wallet, macOS Keychain).
/// Sessions are serialized as JSON under the service name "recsync", with
/// `<app_id>@<server_url>` as the entry name so that each server keeps its
/// own session.
pub struct KeyringSessionStorage {
    account: String,
}

impl KeyringSessionStorage {
    /// Creates storage for one application on one server
    pub fn new(app_id: &str, server_url: &str) -> Self {
        Self {
            account: Self::account_name(app_id, server_url),
        }
    }

    /// Keyring entry name for an application on a server
    pub fn account_name(app_id: &str, server_url: &str) -> String {
        format!("{}@{}", app_id, server_url.trim_end_matches('/'))
    }

    /// Returns the keyring entry name
    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account).context("Failed to create keyring entry")
    }
}

impl ISessionStore for KeyringSessionStorage {
    fn load(&self) -> Result<Option<Session>> {
        match self.entry()?.get_password() {
            Ok(json) => {
                let session: Session = serde_json::from_str(&json)
                    .context("Failed to deserialize session from keyring")?;
                debug!("Loaded session from keyring for {}", self.account);
                Ok(Some(session))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No session found in keyring for {}", self.account);
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    fn store(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session).context("Failed to serialize session")?;

        self.entry()?
            .set_password(&json)
            .context("Failed to store session in keyring")?;

        debug!("Stored session in keyring for {}", self.account);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                info!("Cleared session from keyring for {}", self.account);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No session to clear for {}", self.account);
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}

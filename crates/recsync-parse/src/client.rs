//! Parse Server REST client
//!
//! Provides a typed HTTP client for the Parse Server REST API. Handles the
//! application/session headers, JSON deserialization, error-body mapping and
//! retries of throttled requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recsync_parse::client::ParseClient;
//! use reqwest::Method;
//!
//! # async fn example() -> Result<(), recsync_parse::StoreError> {
//! let client = ParseClient::with_base_url("appid", "http://localhost:8085/api");
//! let page: serde_json::Value = client
//!     .send_json(Method::GET, "/classes/DataStore", |rb| rb.query(&[("limit", 10)]))
//!     .await?;
//! println!("{page}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use recsync_core::config::{HttpConfig, ServerConfig};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info, warn};

use crate::{StoreError, CODE_INVALID_SESSION_TOKEN, CODE_OBJECT_NOT_FOUND};

/// Header carrying the application id
pub const HEADER_APPLICATION_ID: &str = "X-Parse-Application-Id";

/// Header carrying the client (JavaScript) key
pub const HEADER_JAVASCRIPT_KEY: &str = "X-Parse-JavaScript-Key";

/// Header carrying the session token of the logged-in user
pub const HEADER_SESSION_TOKEN: &str = "X-Parse-Session-Token";

/// Default retry-after duration when header is missing (30 seconds)
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Maximum number of retries for 429 responses
const DEFAULT_MAX_RETRIES: u32 = 5;

/// Error body returned by Parse Server: `{"code": 101, "error": "Object not found."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<i64>,
    error: Option<String>,
}

// ============================================================================
// ParseClient
// ============================================================================

/// HTTP client for Parse Server REST calls
///
/// Wraps `reqwest::Client` with the Parse headers and base URL construction.
/// Cloning is cheap; the connection pool is shared.
#[derive(Debug, Clone)]
pub struct ParseClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without trailing slash
    base_url: String,
    /// Application id
    app_id: String,
    /// Client key; empty means not sent
    client_key: String,
    /// Session token of the logged-in user
    session_token: Option<String>,
    /// Retries of a 429 response before giving up
    max_retries: u32,
}

impl ParseClient {
    /// Creates a client from the configuration sections
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(server: &ServerConfig, http: &HttpConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: server.url.trim_end_matches('/').to_string(),
            app_id: server.app_id.clone(),
            client_key: server.client_key.clone(),
            session_token: None,
            max_retries: http.max_retries,
        })
    }

    /// Creates a client with default HTTP settings (useful for testing)
    ///
    /// # Arguments
    /// * `app_id` - Parse application id
    /// * `base_url` - Base URL of the REST API
    pub fn with_base_url(app_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            client_key: String::new(),
            session_token: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets the client key sent as `X-Parse-JavaScript-Key`
    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = client_key.into();
        self
    }

    /// Sets the number of 429 retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a copy of this client acting on behalf of a session
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Updates the session token (e.g., after login or logout)
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
        debug!(logged_in = self.session_token.is_some(), "Updated ParseClient session");
    }

    /// Returns the current session token
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Returns the application id
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a request builder carrying the Parse headers
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to base URL (e.g., "/classes/DataStore")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, &url)
            .header(HEADER_APPLICATION_ID, &self.app_id);

        if !self.client_key.is_empty() {
            builder = builder.header(HEADER_JAVASCRIPT_KEY, &self.client_key);
        }
        if let Some(token) = &self.session_token {
            builder = builder.header(HEADER_SESSION_TOKEN, token);
        }
        builder
    }

    // ========================================================================
    // execute_with_retry - 429 response handling
    // ========================================================================

    /// Executes a request, retrying on HTTP 429 (Too Many Requests)
    ///
    /// The request is rebuilt for every attempt: `customize` receives the
    /// header-carrying builder and adds query parameters, body or extra
    /// headers. The `Retry-After` header decides the wait between attempts.
    ///
    /// # Returns
    /// The first non-429 response, whatever its status
    pub async fn execute_with_retry<F>(
        &self,
        method: Method,
        path: &str,
        customize: F,
    ) -> Result<Response, StoreError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            debug!(%method, path, attempt, "Sending request");
            let response = customize(self.request(method.clone(), path)).send().await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                if attempt > 0 {
                    info!(path, attempt, "Request succeeded after retry");
                }
                return Ok(response);
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
                .unwrap_or(DEFAULT_RETRY_AFTER);

            if attempt >= self.max_retries {
                warn!(path, attempts = attempt + 1, "429 retry limit exhausted");
                return Err(StoreError::TooManyRequests { retry_after });
            }

            info!(
                path,
                attempt,
                retry_after_ms = retry_after.as_millis() as u64,
                "Received 429, backing off"
            );
            tokio::time::sleep(retry_after).await;
            attempt += 1;
        }
    }

    /// Executes a request and deserializes a successful JSON body
    ///
    /// Error statuses are mapped to [`StoreError`] from the Parse error body.
    pub async fn send_json<T, F>(
        &self,
        method: Method,
        path: &str,
        customize: F,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let response = self.execute_with_retry(method, path, customize).await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("{path}: {e}")))
    }
}

/// Passes successful responses through; maps error statuses to [`StoreError`]
pub(crate) async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error.unwrap_or_else(|| text.clone())),
        Err(_) => (None, text),
    };

    let err = classify_error(status, code, message);
    debug!(status = status.as_u16(), error = %err, "Request failed");
    Err(err)
}

/// Maps an HTTP status plus optional Parse error code to a [`StoreError`]
///
/// Parse error codes win over the HTTP status because Parse reports most
/// client errors with 400 or 404.
pub fn classify_error(status: StatusCode, code: Option<i64>, message: String) -> StoreError {
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };

    match code {
        Some(CODE_INVALID_SESSION_TOKEN) => return StoreError::InvalidSession(message),
        Some(CODE_OBJECT_NOT_FOUND) => return StoreError::NotFound(message),
        _ => {}
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        StoreError::Unauthorized(message)
    } else if status.is_server_error() {
        StoreError::ServerError(message)
    } else {
        StoreError::Store {
            code: code.unwrap_or_else(|| i64::from(status.as_u16())),
            message,
        }
    }
}

/// Parses a `Retry-After` header value
///
/// Accepts delay-seconds or an HTTP-date at most one hour ahead; anything
/// else yields `default`.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let diff = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        if let Ok(secs) = u64::try_from(diff.num_seconds()) {
            if secs <= 3600 {
                return Duration::from_secs(secs);
            }
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}

//! Configuration module for recsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{ClassName, RecordShape};

/// Default application id of a local Parse Server
pub const DEFAULT_APP_ID: &str = "appid";

/// Default REST endpoint of a local Parse Server
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8085/api";

/// Default class the tool operates on
pub const DEFAULT_CLASS_NAME: &str = "DataStore";

/// Largest page the store accepts for a single query
pub const MAX_PAGE_SIZE: usize = 1000;

/// Environment variable overriding `server.app_id`
pub const ENV_APP_ID: &str = "PARSE_APP_ID";

/// Environment variable overriding `server.client_key`
pub const ENV_CLIENT_KEY: &str = "PARSE_JAVASCRIPT_KEY";

/// Environment variable overriding `server.url`
pub const ENV_SERVER_URL: &str = "PARSE_SERVER_URL";

/// Deployment placeholders that mean "not configured"
const PLACEHOLDERS: &[&str] = &["APP_ID_TO_BE_ADDED", "PARSE_SERVER_URL_TO_BE_ADDED"];

/// Fields recognized in the default `DataStore` class
const DEFAULT_FIELDS: &[&str] = &[
    "company1", "no1", "company", "tel0", "tel1", "tel2", "tel3", "tel", "id3", "no", "mail1",
    "zip1", "zip", "address1", "URL", "XML", "longitude", "latitude", "ido", "mail", "ID",
    "address", "keido", "lat", "lon", "geolocation", "active", "hp1", "map", "hp0", "hp", "id1",
    "id2", "hpmail1", "hpmail2", "hpmail", "program1", "program", "download", "com2", "com",
];

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for recsync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub records: RecordsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Remote store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Application id sent as `X-Parse-Application-Id`.
    pub app_id: String,
    /// Client (JavaScript) key; empty means the header is not sent.
    pub client_key: String,
    /// Base URL of the REST API, e.g. `http://localhost:8085/api`.
    pub url: String,
}

/// Which class to synchronize and how to page through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Class name in the remote store.
    pub class_name: String,
    /// Recognized field names, in display order. Empty keeps every field.
    pub fields: Vec<String>,
    /// Records per query page (1..=1000).
    pub page_size: usize,
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries of a throttled (429) request before giving up.
    pub max_retries: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Write the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/recsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("recsync")
            .join("config.yaml")
    }

    /// Apply `PARSE_APP_ID`, `PARSE_JAVASCRIPT_KEY` and `PARSE_SERVER_URL`
    /// from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply server overrides from `lookup`.
    ///
    /// Unset variables leave the value alone. Empty values and deployment
    /// placeholders reset the value to its default.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_APP_ID) {
            self.server.app_id = or_default(value, DEFAULT_APP_ID);
        }
        if let Some(value) = lookup(ENV_CLIENT_KEY) {
            self.server.client_key = or_default(value, "");
        }
        if let Some(value) = lookup(ENV_SERVER_URL) {
            self.server.url = or_default(value, DEFAULT_SERVER_URL);
        }
    }

    /// Record shape described by the `records` section.
    pub fn record_shape(&self) -> Result<RecordShape, crate::domain::DomainError> {
        let class_name = ClassName::new(self.records.class_name.clone())?;
        Ok(RecordShape::new(class_name, self.records.fields.clone()))
    }
}

fn or_default(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed) {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            client_key: String::new(),
            url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"records.page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- server ---
        if self.server.app_id.trim().is_empty() {
            errors.push(ValidationError {
                field: "server.app_id".into(),
                message: "must not be empty".into(),
            });
        }
        match url::Url::parse(&self.server.url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => errors.push(ValidationError {
                field: "server.url".into(),
                message: format!("unsupported scheme '{}'; use http or https", parsed.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "server.url".into(),
                message: format!("invalid URL '{}': {e}", self.server.url),
            }),
        }

        // --- records ---
        if let Err(e) = ClassName::new(self.records.class_name.clone()) {
            errors.push(ValidationError {
                field: "records.class_name".into(),
                message: e.to_string(),
            });
        }
        if self.records.page_size == 0 || self.records.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError {
                field: "records.page_size".into(),
                message: format!("must be in range 1..={MAX_PAGE_SIZE}"),
            });
        }

        // --- http ---
        if self.http.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "http.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use recsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .server_url("https://parse.example.com/parse")
///     .class_name("Customer")
///     .fields(vec!["firstName".into(), "lastName".into()])
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- server ---

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config.server.app_id = app_id.into();
        self
    }

    pub fn client_key(mut self, key: impl Into<String>) -> Self {
        self.config.server.client_key = key.into();
        self
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server.url = url.into();
        self
    }

    // --- records ---

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.config.records.class_name = class_name.into();
        self
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.config.records.fields = fields;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.records.page_size = page_size;
        self
    }

    // --- http ---

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.config.http.timeout_secs = seconds;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.http.max_retries = retries;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! CLI subcommands and the shared wiring they use
//!
//! Every command receives a [`CommandContext`] carrying the global flags. The
//! helpers here build the Parse client, the keyring session storage and the
//! sync engine from the loaded configuration.

pub mod auth;
pub mod completions;
pub mod config;
pub mod hello;
pub mod records;
pub mod upload;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use recsync_core::config::Config;
use recsync_core::domain::RecordShape;
use recsync_core::ports::ISessionStore;
use recsync_parse::{auth::KeyringSessionStorage, client::ParseClient, provider::ParseRecordStore};
use recsync_sync::SyncEngine;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global flags shared by every command
pub struct CommandContext {
    config_path: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
}

impl CommandContext {
    pub fn new(config_path: Option<PathBuf>, format: OutputFormat, quiet: bool) -> Self {
        Self {
            config_path,
            format,
            quiet,
        }
    }

    /// Config file in use: `--config` or the platform default
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(Config::default_path)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    /// Loads the file configuration without environment overrides
    ///
    /// A missing default file yields the defaults; a file named with
    /// `--config` must exist.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display())),
            None => Ok(Config::load_or_default(&Config::default_path())),
        }
    }

    /// Loads the configuration, applies environment overrides and validates it
    pub fn config(&self) -> Result<Config> {
        let mut config = self.load_config()?;
        config.apply_env();

        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Invalid configuration: {}", messages.join("; "));
        }
        Ok(config)
    }
}

/// Keyring storage for the session of the configured server
pub fn session_storage(config: &Config) -> KeyringSessionStorage {
    KeyringSessionStorage::new(&config.server.app_id, &config.server.url)
}

/// Parse client for the configured server, without a session
pub fn anonymous_client(config: &Config) -> Result<ParseClient> {
    ParseClient::new(&config.server, &config.http).context("Failed to create Parse client")
}

/// Parse client carrying the stored session token, if any
pub fn session_client(config: &Config) -> Result<ParseClient> {
    let mut client = anonymous_client(config)?;
    match session_storage(config).load()? {
        Some(session) => {
            debug!(username = %session.username, "Using stored session");
            client.set_session_token(Some(session.session_token));
        }
        None => debug!("No stored session; sending requests without a session token"),
    }
    Ok(client)
}

/// Record shape from the configuration, with an optional class override
pub fn record_shape(config: &Config, class: Option<&str>) -> Result<RecordShape> {
    let mut records = config.records.clone();
    if let Some(class) = class {
        records.class_name = class.to_string();
    }
    let config = Config {
        records,
        ..config.clone()
    };
    config.record_shape().context("Invalid class name")
}

/// Sync engine over the configured Parse Server
pub fn sync_engine(config: &Config) -> Result<SyncEngine> {
    let store = ParseRecordStore::new(session_client(config)?);
    Ok(SyncEngine::new(Arc::new(store), config))
}

/// Reads a text file, naming it in the error
pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

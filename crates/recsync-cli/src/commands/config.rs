//! Config command - View and manage recsync configuration
//!
//! Provides the `recsync config` CLI command which:
//! 1. Shows the current configuration (YAML or JSON)
//! 2. Sets individual configuration values via dot-notation keys
//! 3. Validates the configuration file and reports errors
//! 4. Prints the path of the configuration file

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use recsync_core::config::Config;

use super::CommandContext;

/// Keys accepted by `config set`, with a short description
const SUPPORTED_KEYS: &[(&str, &str)] = &[
    ("server.app_id", "Parse application id"),
    ("server.client_key", "JavaScript key (empty for none)"),
    ("server.url", "Parse Server base URL"),
    ("records.class_name", "Class to synchronize"),
    ("records.fields", "Comma-separated recognized field names"),
    ("records.page_size", "Records per query (1-1000)"),
    ("http.timeout_secs", "Request timeout in seconds"),
    ("http.max_retries", "Retries after HTTP 429"),
    ("logging.level", "trace|debug|info|warn|error"),
    ("logging.json", "true|false"),
];

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "records.page_size")
        key: String,
        /// New value
        value: String,
    },
    /// Validate configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(ctx),
            ConfigCommand::Set { key, value } => execute_set(ctx, key, value),
            ConfigCommand::Validate => execute_validate(ctx),
            ConfigCommand::Path => execute_path(ctx),
        }
    }
}

/// Shows the file configuration with environment overrides applied
fn execute_show(ctx: &CommandContext) -> Result<()> {
    let fmt = ctx.formatter();
    let config_path = ctx.config_path();
    let mut config = ctx.load_config()?;
    config.apply_env();

    info!(config_path = %config_path.display(), "Showing configuration");

    if ctx.is_json() {
        let json =
            serde_json::to_value(&config).context("Failed to serialize configuration to JSON")?;
        fmt.print_json(&json);
    } else {
        fmt.success(&format!("Configuration ({})", config_path.display()));
        fmt.info("");
        let yaml =
            serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            fmt.info(line);
        }
    }
    Ok(())
}

/// Sets one key in the configuration file
///
/// Environment overrides are not written back to the file.
fn execute_set(ctx: &CommandContext, key: &str, value: &str) -> Result<()> {
    let fmt = ctx.formatter();
    let config_path = ctx.config_path();
    let mut config = Config::load_or_default(&config_path);

    info!(key, value, "Setting configuration value");

    if let Err(e) = apply_config_value(&mut config, key, value) {
        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "success": false,
                "key": key,
                "value": value,
                "error": e.to_string(),
            }));
        } else {
            fmt.error(&format!("Failed to set '{}': {}", key, e));
            fmt.info("");
            fmt.info("Supported keys:");
            for (name, description) in SUPPORTED_KEYS {
                fmt.info(&format!("  {:<22} - {}", name, description));
            }
        }
        return Err(e);
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "success": false,
                "key": key,
                "value": value,
                "errors": messages,
            }));
        }
        anyhow::bail!("Invalid value for '{}': {}", key, messages.join("; "));
    }

    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    if ctx.is_json() {
        fmt.print_json(&serde_json::json!({
            "success": true,
            "key": key,
            "value": value,
            "config_path": config_path.display().to_string(),
        }));
    } else {
        fmt.success(&format!("Set {} = {}", key, value));
        fmt.info(&format!("Saved to {}", config_path.display()));
    }
    Ok(())
}

fn execute_validate(ctx: &CommandContext) -> Result<()> {
    let fmt = ctx.formatter();
    let config_path = ctx.config_path();

    if !config_path.exists() {
        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "errors": [],
                "note": "Configuration file not found. Using defaults.",
            }));
        } else {
            fmt.info(&format!(
                "Configuration file not found at {}",
                config_path.display()
            ));
            fmt.info("Using default configuration. Run 'recsync config set <key> <value>' to create one.");
        }
        return Ok(());
    }

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to parse configuration {}", config_path.display()))?;

    info!(config_path = %config_path.display(), "Validating configuration");
    let errors = config.validate();

    if ctx.is_json() {
        let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        fmt.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": config_path.display().to_string(),
            "errors": error_strings,
        }));
    } else if errors.is_empty() {
        fmt.success("Configuration is valid");
        fmt.info(&format!("File: {}", config_path.display()));
    } else {
        fmt.error(&format!(
            "Configuration has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        fmt.info(&format!("File: {}", config_path.display()));
        fmt.info("");
        for error in &errors {
            fmt.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Configuration is invalid")
    }
}

fn execute_path(ctx: &CommandContext) -> Result<()> {
    let config_path = ctx.config_path();
    if ctx.is_json() {
        ctx.formatter().print_json(&serde_json::json!({
            "config_path": config_path.display().to_string(),
            "exists": config_path.exists(),
        }));
    } else {
        println!("{}", config_path.display());
    }
    Ok(())
}

/// Apply a dot-notation key/value pair to a Config struct
///
/// See [`SUPPORTED_KEYS`] for the accepted keys.
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- server ---
        "server.app_id" => {
            config.server.app_id = value.to_string();
        }
        "server.client_key" => {
            config.server.client_key = value.to_string();
        }
        "server.url" => {
            config.server.url = value.trim_end_matches('/').to_string();
        }

        // --- records ---
        "records.class_name" => {
            config.records.class_name = value.to_string();
        }
        "records.fields" => {
            config.records.fields = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        "records.page_size" => {
            config.records.page_size = value
                .parse::<usize>()
                .context("Expected a positive integer for records.page_size")?;
        }

        // --- http ---
        "http.timeout_secs" => {
            config.http.timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for http.timeout_secs")?;
        }
        "http.max_retries" => {
            config.http.max_retries = value
                .parse::<u32>()
                .context("Expected a positive integer for http.max_retries")?;
        }

        // --- logging ---
        "logging.level" => {
            config.logging.level = value.to_string();
        }
        "logging.json" => {
            config.logging.json = value
                .parse::<bool>()
                .context("Expected true or false for logging.json")?;
        }

        _ => {
            anyhow::bail!("Unknown configuration key: '{}'", key);
        }
    }

    Ok(())
}

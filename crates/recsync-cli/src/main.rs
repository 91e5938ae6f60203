//! recsync CLI - Command-line interface for recsync
//!
//! Provides commands for:
//! - Logging in and out of the Parse Server
//! - Listing and exporting the records of a class
//! - Replacing every record of a class with the rows of a CSV file
//! - Viewing and editing the configuration
//! - Calling the `hello` cloud function

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod progress;

use commands::{
    auth::AuthCommand, completions::CompletionsCommand, config::ConfigCommand,
    hello::HelloCommand, records::RecordsCommand, upload::UploadCommand, CommandContext,
};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "recsync", version, about = "Synchronize Parse Server records with CSV files")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in to or out of the Parse Server
    #[command(subcommand)]
    Auth(AuthCommand),
    /// List or export the records of a class
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Replace every record of a class with the rows of a CSV file
    Upload(UploadCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Call the hello cloud function
    Hello(HelloCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Installs the tracing subscriber
///
/// `RUST_LOG` wins; otherwise `-v`/`-vv` and `--quiet` adjust the level from
/// the configuration file.
fn init_tracing(cli: &Cli, ctx: &CommandContext) {
    let config = ctx.load_config().unwrap_or_default();
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => config.logging.level.clone(),
        (false, 1) => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CommandContext::new(cli.config.clone(), format, cli.quiet);

    init_tracing(&cli, &ctx);

    let result = match &cli.command {
        Commands::Auth(cmd) => cmd.execute(&ctx).await,
        Commands::Records(cmd) => cmd.execute(&ctx).await,
        Commands::Upload(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Hello(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    };

    if let Err(e) = result {
        get_formatter(format, false).error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}

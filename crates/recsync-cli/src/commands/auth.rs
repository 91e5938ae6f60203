//! Auth commands - Login, Logout, and Status against the Parse user service
//!
//! Provides the `recsync auth` CLI subcommands which:
//! 1. `login`  - Logs in with username and password and stores the session
//!    token in the system keyring.
//! 2. `logout` - Revokes the session on the server and clears the keyring.
//! 3. `status` - Validates the stored session with the server.

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use recsync_core::config::Config;
use recsync_core::domain::Session;
use recsync_core::usecases::AuthenticateUseCase;
use recsync_parse::auth::ParseAuthAdapter;

use super::{anonymous_client, session_storage, CommandContext};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Log in with a Parse user account
    Login {
        /// Parse username
        #[arg(long, short)]
        username: String,
        /// Password (prefer the environment variable over the flag)
        #[arg(long, env = "RECSYNC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Revoke the session and remove it from the keyring
    Logout,
    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.config()?;
        let use_case = authenticate_use_case(&config)?;

        match self {
            AuthCommand::Login { username, password } => {
                execute_login(ctx, &config, &use_case, username, password).await
            }
            AuthCommand::Logout => execute_logout(ctx, &use_case).await,
            AuthCommand::Status => execute_status(ctx, &config, &use_case).await,
        }
    }
}

fn authenticate_use_case(config: &Config) -> Result<AuthenticateUseCase> {
    let adapter = ParseAuthAdapter::new(anonymous_client(config)?);
    Ok(AuthenticateUseCase::new(
        Arc::new(adapter),
        Arc::new(session_storage(config)),
    ))
}

fn session_json(session: &Session, server: &str) -> serde_json::Value {
    serde_json::json!({
        "authenticated": true,
        "username": session.username,
        "user_id": session.user_id,
        "server": server,
        "logged_in_at": session.logged_in_at.to_rfc3339(),
    })
}

async fn execute_login(
    ctx: &CommandContext,
    config: &Config,
    use_case: &AuthenticateUseCase,
    username: &str,
    password: &str,
) -> Result<()> {
    let fmt = ctx.formatter();
    info!(username, server = %config.server.url, "Logging in");

    let session = use_case.login(username, password).await?;

    if ctx.is_json() {
        fmt.print_json(&session_json(&session, &config.server.url));
    } else {
        fmt.success(&format!("Logged in as {}", session.username));
        fmt.info(&format!("Server:  {}", config.server.url));
        fmt.info("Session stored in the system keyring");
    }
    Ok(())
}

async fn execute_logout(ctx: &CommandContext, use_case: &AuthenticateUseCase) -> Result<()> {
    let fmt = ctx.formatter();

    match use_case.logout().await? {
        Some(session) => {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "logged_out": true,
                    "username": session.username,
                }));
            } else {
                fmt.success(&format!("Logged out {}", session.username));
                fmt.info("Session removed from keyring");
            }
        }
        None => {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({ "logged_out": false }));
            } else {
                fmt.info("Not logged in. Nothing to log out.");
            }
        }
    }
    Ok(())
}

async fn execute_status(
    ctx: &CommandContext,
    config: &Config,
    use_case: &AuthenticateUseCase,
) -> Result<()> {
    let fmt = ctx.formatter();

    match use_case.status().await? {
        Some(session) => {
            if ctx.is_json() {
                fmt.print_json(&session_json(&session, &config.server.url));
            } else {
                fmt.success(&format!("Logged in as {}", session.username));
                fmt.info(&format!("User ID:   {}", session.user_id));
                fmt.info(&format!("Server:    {}", config.server.url));
                fmt.info(&format!(
                    "Since:     {}",
                    session.logged_in_at.format("%Y-%m-%d %H:%M:%S UTC")
                ));
            }
        }
        None => {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "authenticated": false,
                    "server": config.server.url,
                }));
            } else {
                fmt.info("Authentication status: Not logged in");
                fmt.info("Run 'recsync auth login --username <USER>' to log in");
            }
        }
    }
    Ok(())
}

//! Hello command - Call the `hello` cloud function

use anyhow::{Context, Result};
use clap::Args;

use recsync_core::functions::HelloResponse;

use super::{session_client, CommandContext};

/// Arguments for the hello subcommand
#[derive(Debug, Args)]
pub struct HelloCommand {
    /// Answer locally instead of calling the server
    #[arg(long)]
    pub local: bool,
}

impl HelloCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let response = if self.local {
            recsync_core::functions::hello()
        } else {
            let config = ctx.config()?;
            let client = session_client(&config)?;
            recsync_parse::functions::hello(&client)
                .await
                .context("Cloud function 'hello' failed")?
        };
        print_response(ctx, &response)
    }
}

fn print_response(ctx: &CommandContext, response: &HelloResponse) -> Result<()> {
    let fmt = ctx.formatter();
    if ctx.is_json() {
        let json = serde_json::to_value(response).context("Failed to serialize response")?;
        fmt.print_json(&json);
    } else {
        fmt.success(&response.message);
        fmt.info(&format!("Date: {}", response.date));
    }
    Ok(())
}

//! Shell completions generation command
//!
//! Generates completions for bash, zsh, fish, elvish, and powershell.
//! Usage: `recsync completions bash > ~/.local/share/bash-completion/completions/recsync`

use std::io::{self, Write};

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

use super::CommandContext;

/// Binary name the completion scripts complete
const BIN_NAME: &str = "recsync";

/// Arguments for the completions subcommand
#[derive(Debug, clap::Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Prints completions for the chosen shell to stdout
    pub async fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        write_completions(self.shell, &mut io::stdout().lock());
        Ok(())
    }
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = crate::Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
}

//! Upload command - Replace the records of a class with a CSV file
//!
//! Runs the replace workflow: parse the file, fetch the existing records,
//! delete them one by one, then save every row. Progress is drawn with
//! `indicatif` unless `--json` or `--quiet` is set.
//!
//! The replace is not atomic. If it fails midway the class holds part of the
//! old records or part of the new rows; rerunning the upload converges.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use recsync_sync::{CsvDocument, ReplaceSummary};

use super::{read_text, record_shape, sync_engine, CommandContext};
use crate::progress::ProgressObserver;

/// Arguments for the upload subcommand
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// CSV file whose first row names the columns
    pub file: PathBuf,

    /// Class to replace (defaults to records.class_name)
    #[arg(long)]
    pub class: Option<String>,

    /// Parse the file and count existing records without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl UploadCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.config()?;
        let shape = record_shape(&config, self.class.as_deref())?;
        let text = read_text(&self.file).await?;
        let fmt = ctx.formatter();

        info!(file = %self.file.display(), class = %shape.class_name(), dry_run = self.dry_run, "Uploading CSV");

        if self.dry_run {
            let document = CsvDocument::parse(&text)?;
            let mut engine = sync_engine(&config)?;
            let existing = engine.fetch_all(&shape).await?;

            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "dry_run": true,
                    "class": shape.class_name().as_str(),
                    "columns": document.header(),
                    "would_delete": existing.len(),
                    "would_upload": document.len(),
                }));
            } else {
                fmt.success(&format!("{} is valid CSV", self.file.display()));
                fmt.info(&format!("Columns:      {}", document.header().join(", ")));
                fmt.info(&format!(
                    "Would delete: {} records from {}",
                    existing.len(),
                    shape.class_name()
                ));
                fmt.info(&format!("Would upload: {} rows", document.len()));
            }
            return Ok(());
        }

        let observer = Arc::new(ProgressObserver::new(!ctx.is_json() && !ctx.is_quiet()));
        let mut engine = sync_engine(&config)?.with_observer(observer);
        let ReplaceSummary { deleted, uploaded } = engine.replace(&shape, &text).await?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "class": shape.class_name().as_str(),
                "status": engine.state().status().name(),
                "deleted": deleted,
                "uploaded": uploaded,
            }));
        } else {
            fmt.success(&format!(
                "Replaced {} records in {} with {} rows",
                deleted,
                shape.class_name(),
                uploaded
            ));
        }
        Ok(())
    }
}

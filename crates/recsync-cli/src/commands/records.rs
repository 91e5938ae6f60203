//! Records commands - List and export the records of a class
//!
//! Both commands page through the whole class with the sync engine, then
//! either print the records or write them as CSV.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use recsync_core::domain::{Record, RecordShape};
use recsync_sync::CsvDocument;

use super::{record_shape, sync_engine, CommandContext};

/// Shape fields shown by `records list` in human output
const LIST_COLUMNS: usize = 4;

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// Print the records of a class
    List {
        /// Class to read (defaults to records.class_name)
        #[arg(long)]
        class: Option<String>,
        /// Show at most this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Write every record of a class to a CSV file
    Export {
        /// Output file, or "-" for stdout
        #[arg(long, short)]
        output: PathBuf,
        /// Class to read (defaults to records.class_name)
        #[arg(long)]
        class: Option<String>,
    },
}

impl RecordsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.config()?;
        let class = match self {
            RecordsCommand::List { class, .. } | RecordsCommand::Export { class, .. } => {
                class.as_deref()
            }
        };
        let shape = record_shape(&config, class)?;

        let mut engine = sync_engine(&config)?;
        let records = engine.fetch_all(&shape).await?;
        info!(class = %shape.class_name(), count = records.len(), "Fetched records");

        match self {
            RecordsCommand::List { limit, .. } => list(ctx, &shape, &records, *limit),
            RecordsCommand::Export { output, .. } => export(ctx, &shape, &records, output),
        }
    }
}

/// Columns for human output: identity plus the first shape fields
fn list_header(shape: &RecordShape) -> Vec<String> {
    shape.header().into_iter().take(3 + LIST_COLUMNS).collect()
}

fn list(
    ctx: &CommandContext,
    shape: &RecordShape,
    records: &[Record],
    limit: Option<usize>,
) -> Result<()> {
    let fmt = ctx.formatter();
    let shown = &records[..limit.unwrap_or(records.len()).min(records.len())];

    if ctx.is_json() {
        let json = serde_json::to_value(shown).context("Failed to serialize records")?;
        fmt.print_json(&json);
        return Ok(());
    }

    fmt.success(&format!(
        "{} records in {}",
        records.len(),
        shape.class_name()
    ));
    if shown.is_empty() {
        return Ok(());
    }

    let header = list_header(shape);
    let rows: Vec<Vec<String>> = shown
        .iter()
        .map(|record| header.iter().map(|name| record.value(name)).collect())
        .collect();
    fmt.print_table(&header, &rows);

    if shown.len() < records.len() {
        fmt.info(&format!("... {} more", records.len() - shown.len()));
    }
    Ok(())
}

fn export(
    ctx: &CommandContext,
    shape: &RecordShape,
    records: &[Record],
    output: &Path,
) -> Result<()> {
    let document = CsvDocument::from_records(records, shape);

    if output.as_os_str() == "-" {
        document.write_to(io::stdout().lock())?;
        return Ok(());
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    document.write_to(BufWriter::new(file))?;

    let fmt = ctx.formatter();
    if ctx.is_json() {
        fmt.print_json(&serde_json::json!({
            "exported": records.len(),
            "class": shape.class_name().as_str(),
            "output": output.display().to_string(),
        }));
    } else {
        fmt.success(&format!(
            "Exported {} records to {}",
            records.len(),
            output.display()
        ));
    }
    Ok(())
}

//! CSV document adapter
//!
//! Decodes comma-separated text into ordered field maps and encodes records
//! back to CSV. The first non-blank row is the header; every later row must
//! have exactly as many fields as the header. Values are kept as strings.

use std::collections::HashSet;
use std::io::Write;

use ::csv::{ReaderBuilder, StringRecord, WriterBuilder};
use thiserror::Error;
use tracing::warn;

use recsync_core::domain::{Fields, Record, RecordShape};

/// Errors raised while reading or writing CSV
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// A data row does not have as many fields as the header
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// 1-based line of the offending row
        line: u64,
        /// Number of header fields
        expected: usize,
        /// Number of fields in the row
        found: usize,
    },

    /// The text is not valid CSV (bad quoting, invalid UTF-8)
    #[error("line {line}: {message}")]
    Malformed {
        /// 1-based line where reading failed
        line: u64,
        /// Reader error description
        message: String,
    },

    /// Writing CSV failed
    #[error("failed to write CSV: {0}")]
    Write(String),
}

/// A parsed CSV file: header plus data rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvDocument {
    header: Vec<String>,
    rows: Vec<Fields>,
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// Renames repeated column names to `name_1`, `name_2`, ...
///
/// Every column keeps its own key, so no value is overwritten.
fn dedupe_header(names: Vec<String>) -> Vec<String> {
    let original: HashSet<String> = names.iter().cloned().collect();
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());

    names
        .into_iter()
        .map(|name| {
            if used.insert(name.clone()) {
                return name;
            }
            let mut suffix = 1;
            loop {
                let candidate = format!("{name}_{suffix}");
                if !original.contains(&candidate) && used.insert(candidate.clone()) {
                    warn!(column = %name, renamed = %candidate, "Duplicate CSV column renamed");
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

impl CsvDocument {
    /// Parses CSV text
    ///
    /// Empty lines are skipped; a line holding only separators or spaces is
    /// a row like any other. Repeated header names get a `_N` suffix.
    /// Empty input, or a header without data rows, yields a document with
    /// no rows.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed row; nothing is returned for the rows
    /// before it.
    pub fn parse(text: &str) -> Result<Self, CsvError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| CsvError::Malformed {
                line: e.position().map(|p| p.line()).unwrap_or_default(),
                message: e.to_string(),
            })?;

            match &header {
                None => {
                    let names = record
                        .iter()
                        .enumerate()
                        .map(|(i, name)| {
                            if i == 0 {
                                name.trim_start_matches('\u{feff}').to_string()
                            } else {
                                name.to_string()
                            }
                        })
                        .collect();
                    header = Some(dedupe_header(names));
                }
                Some(names) => {
                    if record.len() != names.len() {
                        return Err(CsvError::FieldCount {
                            line: line_of(&record),
                            expected: names.len(),
                            found: record.len(),
                        });
                    }
                    rows.push(
                        names
                            .iter()
                            .zip(record.iter())
                            .map(|(name, value)| (name.as_str(), value))
                            .collect(),
                    );
                }
            }
        }

        Ok(Self {
            header: header.unwrap_or_default(),
            rows,
        })
    }

    /// Builds a document from records, with columns from the shape's header
    pub fn from_records(records: &[Record], shape: &RecordShape) -> Self {
        let header = shape.header();
        let rows = records
            .iter()
            .map(|record| {
                header
                    .iter()
                    .map(|name| (name.clone(), record.value(name)))
                    .collect()
            })
            .collect();
        Self { header, rows }
    }

    /// Column names in file order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows in file order
    pub fn rows(&self) -> &[Fields] {
        &self.rows
    }

    /// Consumes the document, returning its rows
    pub fn into_rows(self) -> Vec<Fields> {
        self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the header and rows as CSV
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), CsvError> {
        let mut out = WriterBuilder::new().from_writer(writer);
        let write_err = |e: ::csv::Error| CsvError::Write(e.to_string());

        out.write_record(&self.header).map_err(write_err)?;
        for row in &self.rows {
            let values = self
                .header
                .iter()
                .map(|name| row.get(name).unwrap_or_default());
            out.write_record(values).map_err(write_err)?;
        }
        out.flush().map_err(|e| CsvError::Write(e.to_string()))?;
        Ok(())
    }

    /// Renders the document as a CSV string
    pub fn to_csv_string(&self) -> Result<String, CsvError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| CsvError::Write(e.to_string()))
    }
}

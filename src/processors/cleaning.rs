//! Blank-row removal for telemetry pasted from the hub console.
//!
//! The hub terminates every printed record with `\r\n`, so a log copied from
//! the console has an empty row between consecutive data rows. Cleaning keeps
//! every row with content, comment markers included, and drops the rest.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

/// Errors that can occur during cleaning.
#[derive(Debug, Error)]
pub enum CleaningError {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Input file has no content: {0}")]
    NoContent(String),
}

/// Row counts from a cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Rows written to the output, header and comments included.
    pub kept: usize,
    /// Blank rows removed.
    pub dropped: usize,
    /// Kept rows that are `#` markers.
    pub comments: usize,
}

/// True for rows with no data, such as `""`, `"\r"` or `",,,"`.
pub fn is_blank_row(line: &str) -> bool {
    line.split(',').all(|field| field.trim().is_empty())
}

/// Copy `input` to `output` without blank rows.
///
/// # Arguments
///
/// * `input` - Raw CSV as captured from the console
/// * `output` - Destination path; parent directories are created
///
/// # Returns
///
/// Counts of kept, dropped and comment rows.
///
/// # Errors
///
/// Returns an error if the input is missing or has no non-blank rows, or
/// the output cannot be written.
pub fn clean_rows(input: &Path, output: &Path) -> Result<CleanStats> {
    if !input.is_file() {
        return Err(CleaningError::InputNotFound(input.display().to_string()).into());
    }

    let file = File::open(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let reader = BufReader::new(file);

    let mut kept_rows = Vec::new();
    let mut stats = CleanStats::default();

    for line in reader.lines() {
        let line = line.with_context(|| format!("Failed to read {}", input.display()))?;
        let row = line.trim_end_matches('\r');

        if is_blank_row(row) {
            stats.dropped += 1;
            continue;
        }

        if row.trim_start().starts_with('#') {
            stats.comments += 1;
        }
        kept_rows.push(row.to_string());
    }

    if kept_rows.is_empty() {
        return Err(CleaningError::NoContent(input.display().to_string()).into());
    }
    stats.kept = kept_rows.len();

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let out_file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let mut writer = BufWriter::new(out_file);

    for row in &kept_rows {
        writeln!(writer, "{}", row)?;
    }
    writer.flush()?;

    log::info!(
        "{}: kept {} rows, dropped {} blank rows",
        input.display(),
        stats.kept,
        stats.dropped
    );

    Ok(stats)
}

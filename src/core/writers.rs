//! Data writers for analysis results and generated scripts.
//!
//! This module provides functions for writing:
//! - Segment reports, as plain text lines or CSV
//! - Per-sample velocity and label tables as CSV
//! - Arbitrary text files such as generated replay scripts

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::processors::classifier::{MovementLabel, Segment};
use crate::processors::velocity::Velocities;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Mismatched array lengths.
    #[error("array length mismatch: velocities has {velocities_len} samples, labels has {labels_len} entries")]
    LengthMismatch {
        velocities_len: usize,
        labels_len: usize,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a CSV writer over a buffered file, creating parent directories.
fn create_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dirs(path)?;
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(csv::Writer::from_writer(BufWriter::new(file)))
}

/// Format segments as report lines, one per segment.
///
/// Each line reads `Segment: {start}ms to {end}ms - {label}` with two decimals.
pub fn format_segment_report(segments: &[Segment]) -> String {
    let mut report = String::with_capacity(segments.len() * 48);
    for segment in segments {
        report.push_str(&segment.to_string());
        report.push('\n');
    }
    report
}

/// Write segments to CSV.
///
/// Creates a CSV file with headers "start_ms,end_ms,duration_ms,label".
///
/// # Errors
///
/// Returns an error if parent directories cannot be created or the file
/// cannot be created or written to.
pub fn write_segments_csv(path: &Path, segments: &[Segment]) -> Result<()> {
    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record(["start_ms", "end_ms", "duration_ms", "label"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for segment in segments {
        csv_writer
            .write_record(&[
                format!("{:.2}", segment.start_t),
                format!("{:.2}", segment.end_t),
                format!("{:.2}", segment.duration()),
                segment.label.to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write per-sample velocities and labels to CSV.
///
/// Creates a CSV file with headers "time_ms,drive_v,arm_v,yaw_v,label".
///
/// # Errors
///
/// Returns an error if `labels` does not have one entry per sample, or the
/// file cannot be created or written to.
pub fn write_velocities_csv(
    path: &Path,
    velocities: &Velocities,
    labels: &[MovementLabel],
) -> Result<()> {
    if velocities.len() != labels.len() {
        return Err(WriteError::LengthMismatch {
            velocities_len: velocities.len(),
            labels_len: labels.len(),
        });
    }

    let mut csv_writer = create_csv_writer(path)?;
    let path_str = path.display().to_string();

    csv_writer
        .write_record(["time_ms", "drive_v", "arm_v", "yaw_v", "label"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for (frame, label) in velocities.frames().zip(labels) {
        csv_writer
            .write_record(&[
                format!("{:.2}", frame.t),
                format!("{:.6}", frame.drive_v),
                format!("{:.6}", frame.arm_v),
                format!("{:.6}", frame.yaw_v),
                label.to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}

/// Write a text file, creating parent directories as needed.
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(content.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| WriteError::WriteFile {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(())
}

//! Data loaders for robot telemetry CSV files.
//!
//! This module provides parsers for:
//! - Full telemetry logs (time, relative/absolute angle per motor, yaw/pitch/roll)
//! - Motor-only logs (time plus relative angle of motors A, B and C) used for replay
//!
//! Columns are located by header name, so extra columns and reordering are fine.
//! Rows whose first field starts with `#` are recording markers and are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

/// Header names of the full telemetry CSV, in recording order.
pub const TELEMETRY_COLUMNS: [&str; 10] = [
    "time_ms",
    "motorA_rel_deg",
    "motorA_abs_deg",
    "motorB_rel_deg",
    "motorB_abs_deg",
    "motorC_rel_deg",
    "motorC_abs_deg",
    "yaw_deg",
    "pitch_deg",
    "roll_deg",
];

/// Header names of the simplified motor CSV consumed by the replay generator.
pub const MOTOR_COLUMNS: [&str; 4] = ["time_ms", "motorA_rel_deg", "motorB_rel_deg", "motorC_rel_deg"];

/// Largest magnitude accepted in a motor log, so row differences stay in `i64`.
const MAX_MOTOR_VALUE: f64 = 9.0e15;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No data rows in file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Invalid value {value:?} in column '{column}' at line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// One telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Elapsed time since recording start in milliseconds.
    pub t: f64,
    /// Relative shaft angle of motors A, B, C in degrees (zero at recording start).
    pub motor_rel: [f64; 3],
    /// Absolute shaft angle of motors A, B, C in degrees.
    pub motor_abs: [f64; 3],
    /// Heading in degrees, wrapping at ±180.
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Sample {
    /// Creates a sample with only time, relative motor angles and yaw set.
    pub fn new(t: f64, a_rel: f64, b_rel: f64, c_rel: f64, yaw: f64) -> Self {
        Self {
            t,
            motor_rel: [a_rel, b_rel, c_rel],
            motor_abs: [0.0; 3],
            yaw,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    #[inline]
    pub fn a_rel(&self) -> f64 {
        self.motor_rel[0]
    }

    #[inline]
    pub fn b_rel(&self) -> f64 {
        self.motor_rel[1]
    }

    #[inline]
    pub fn c_rel(&self) -> f64 {
        self.motor_rel[2]
    }
}

/// One row of the motor-only CSV, in whole milliseconds and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorSample {
    pub t: i64,
    pub a_rel: i64,
    pub b_rel: i64,
    pub c_rel: i64,
}

fn open_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(BufReader::new(file)))
}

/// Map each required column name to its index in the header row.
fn column_indices(headers: &StringRecord, required: &[&str]) -> Result<Vec<usize>> {
    let col_map: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !col_map.contains_key(name))
        .collect();

    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing.join(", ")));
    }

    Ok(required.iter().map(|name| col_map[name]).collect())
}

/// True for marker rows such as `#recording_stopped`.
fn is_comment(record: &StringRecord) -> bool {
    record
        .get(0)
        .map(|field| field.trim_start().starts_with('#'))
        .unwrap_or(false)
}

/// True for rows that carry no data at all (e.g. `,,,`).
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn invalid_value(record: &StringRecord, column: &str, raw: &str) -> LoaderError {
    LoaderError::InvalidValue {
        line: record.position().map_or(0, |p| p.line()),
        column: column.to_string(),
        value: raw.to_string(),
    }
}

/// Parse a numeric field. `nan` and `inf` are rejected like any other non-number.
fn parse_field(record: &StringRecord, idx: usize, column: &str) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("").trim();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid_value(record, column, raw)),
    }
}

/// Load a telemetry log from a CSV file.
///
/// # Arguments
///
/// * `path` - Path to a CSV with the columns listed in [`TELEMETRY_COLUMNS`]
///
/// # Returns
///
/// Samples in file order. Timestamps are not reordered or deduplicated.
///
/// # Errors
///
/// Returns an error if a required column is missing, a data row holds a
/// non-numeric value, or the file contains no data rows.
pub fn load_telemetry_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers = reader.headers()?.clone();
    let idx = column_indices(&headers, &TELEMETRY_COLUMNS)?;

    let mut samples = Vec::with_capacity(1024);

    for result in reader.records() {
        let record = result?;
        if is_comment(&record) || is_blank(&record) {
            continue;
        }

        let mut values = [0.0f64; 10];
        for (slot, (&i, column)) in values.iter_mut().zip(idx.iter().zip(TELEMETRY_COLUMNS)) {
            *slot = parse_field(&record, i, column)?;
        }

        samples.push(Sample {
            t: values[0],
            motor_rel: [values[1], values[3], values[5]],
            motor_abs: [values[2], values[4], values[6]],
            yaw: values[7],
            pitch: values[8],
            roll: values[9],
        });
    }

    if samples.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    log::debug!("{}: loaded {} telemetry samples", path.display(), samples.len());
    Ok(samples)
}

/// Load time and relative motor angles from a CSV file.
///
/// Reads only the columns in [`MOTOR_COLUMNS`], so both the simplified
/// 4-column export and the full telemetry log are accepted. Fractional
/// values are rounded to the nearest whole millisecond or degree.
///
/// # Errors
///
/// Same conditions as [`load_telemetry_csv`].
pub fn load_motor_csv<P: AsRef<Path>>(path: P) -> Result<Vec<MotorSample>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers = reader.headers()?.clone();
    let idx = column_indices(&headers, &MOTOR_COLUMNS)?;

    let mut rows = Vec::with_capacity(1024);

    for result in reader.records() {
        let record = result?;
        if is_comment(&record) || is_blank(&record) {
            continue;
        }

        let mut values = [0i64; 4];
        for (slot, (&i, column)) in values.iter_mut().zip(idx.iter().zip(MOTOR_COLUMNS)) {
            let value = parse_field(&record, i, column)?;
            if value.abs() > MAX_MOTOR_VALUE {
                return Err(invalid_value(&record, column, record.get(i).unwrap_or("").trim()));
            }
            *slot = value.round() as i64;
        }

        rows.push(MotorSample {
            t: values[0],
            a_rel: values[1],
            b_rel: values[2],
            c_rel: values[3],
        });
    }

    if rows.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "time_ms,motorA_rel_deg,motorA_abs_deg,motorB_rel_deg,motorB_abs_deg,motorC_rel_deg,motorC_abs_deg,yaw_deg,pitch_deg,roll_deg";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_telemetry_csv() -> Result<()> {
        let file = write_csv(&[
            HEADER,
            "0,0,10,0,20,0,30,1.5,0.1,-0.2",
            "150,5,15,6,26,7,37,2.5,0.2,-0.3",
        ]);

        let samples = load_telemetry_csv(file.path())?;
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].t, 150.0);
        assert_eq!(samples[1].motor_rel, [5.0, 6.0, 7.0]);
        assert_eq!(samples[1].motor_abs, [15.0, 26.0, 37.0]);
        assert_eq!(samples[1].yaw, 2.5);
        assert_eq!(samples[1].roll, -0.3);

        Ok(())
    }

    #[test]
    fn test_skips_comment_and_blank_rows() -> Result<()> {
        let file = write_csv(&[
            "#FLL Robot Data Logger",
            HEADER,
            "0,0,0,0,0,0,0,0,0,0",
            "",
            "150,1,1,1,1,1,1,0,0,0",
            "  #recording_stopped",
            "#recording_stopped",
        ]);

        let samples = load_telemetry_csv(file.path())?;
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].t, 150.0);

        Ok(())
    }

    #[test]
    fn test_header_with_spaces_and_reordered_columns() -> Result<()> {
        let file = write_csv(&[
            "yaw_deg, time_ms, motorA_rel_deg, motorA_abs_deg, motorB_rel_deg, motorB_abs_deg, motorC_rel_deg, motorC_abs_deg, pitch_deg, roll_deg, extra",
            "-90, 50, 1, 2, 3, 4, 5, 6, 7, 8, ignored",
        ]);

        let samples = load_telemetry_csv(file.path())?;
        assert_eq!(samples[0].t, 50.0);
        assert_eq!(samples[0].yaw, -90.0);
        assert_eq!(samples[0].c_rel(), 5.0);

        Ok(())
    }

    #[test]
    fn test_missing_column_is_reported() {
        let file = write_csv(&["time_ms,motorA_rel_deg", "0,0"]);

        match load_telemetry_csv(file.path()) {
            Err(LoaderError::MissingColumns(cols)) => {
                assert!(cols.contains("motorB_rel_deg"));
                assert!(cols.contains("yaw_deg"));
                assert!(!cols.contains("motorA_rel_deg"));
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value_reports_line_and_column() {
        let file = write_csv(&[
            HEADER,
            "0,0,0,0,0,0,0,0,0,0",
            "150,0,0,abc,0,0,0,0,0,0",
        ]);

        match load_telemetry_csv(file.path()) {
            Err(LoaderError::InvalidValue { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "motorB_rel_deg");
                assert_eq!(value, "abc");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        for bad in ["nan", "NaN", "inf", "-inf"] {
            let row = format!("100,{},0,30,0,0,0,0,0,0", bad);
            let file = write_csv(&[HEADER, "0,0,0,0,0,0,0,0,0,0", row.as_str()]);

            match load_telemetry_csv(file.path()) {
                Err(LoaderError::InvalidValue { line, column, value }) => {
                    assert_eq!(line, 3);
                    assert_eq!(column, "motorA_rel_deg");
                    assert_eq!(value, bad);
                }
                other => panic!("Expected InvalidValue for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_motor_csv_rejects_non_finite_and_huge_values() {
        for bad in ["-inf", "nan", "1e300"] {
            let row = format!("0,{},0,0", bad);
            let file = write_csv(&[
                "time_ms,motorA_rel_deg,motorB_rel_deg,motorC_rel_deg",
                row.as_str(),
                "100,10,0,0",
            ]);

            match load_motor_csv(file.path()) {
                Err(LoaderError::InvalidValue { line, column, .. }) => {
                    assert_eq!(line, 2);
                    assert_eq!(column, "motorA_rel_deg");
                }
                other => panic!("Expected InvalidValue for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_empty_file() {
        let file = write_csv(&[HEADER, "#recording_stopped"]);
        assert!(matches!(
            load_telemetry_csv(file.path()),
            Err(LoaderError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_load_motor_csv_from_full_log() -> Result<()> {
        let file = write_csv(&[
            HEADER,
            "0,0,10,0,20,0,30,0,0,0",
            "150,45.6,15,-12,26,90,37,0,0,0",
        ]);

        let rows = load_motor_csv(file.path())?;
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            MotorSample {
                t: 150,
                a_rel: 46,
                b_rel: -12,
                c_rel: 90,
            }
        );

        Ok(())
    }

    #[test]
    fn test_load_motor_csv_simplified() -> Result<()> {
        let file = write_csv(&[
            "time_ms,motorA_rel_deg,motorB_rel_deg,motorC_rel_deg",
            "0,0,0,0",
            "100,10,20,30",
        ]);

        let rows = load_motor_csv(file.path())?;
        assert_eq!(rows[1].c_rel, 30);

        Ok(())
    }
}

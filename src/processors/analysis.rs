//! End-to-end movement analysis of a telemetry log.
//!
//! Stages: heading unwrap, optional heading smoothing, velocity estimation
//! with per-channel smoothing, per-sample labeling, segment construction.
//!
//! # Example
//!
//! ```no_run
//! use motion_pipeline::config::AnalysisConfig;
//! use motion_pipeline::processors::analysis::analyze_csv;
//!
//! let analysis = analyze_csv("cleaned_data.csv", &AnalysisConfig::default()).unwrap();
//! for segment in &analysis.segments {
//!     println!("{}", segment);
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::core::loaders::{load_telemetry_csv, Sample};
use crate::core::transforms::{ema, unwrap_angles};

use super::classifier::{build_segments, classify_all, MovementLabel, Segment, Thresholds};
use super::velocity::{estimate_velocities, Velocities};

/// Errors raised by the analysis stages.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("at least 2 samples are needed to compute velocities, found {found}")]
    InsufficientSamples { found: usize },

    #[error("{what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Output of a full analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Smoothed velocity channels, one entry per sample.
    pub velocities: Velocities,
    /// Instantaneous label of each sample.
    pub labels: Vec<MovementLabel>,
    /// Segments that passed the minimum-duration filter, in time order.
    pub segments: Vec<Segment>,
}

impl Analysis {
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.velocities.len()
    }

    /// Total segment time per label in milliseconds, in declaration order.
    ///
    /// Labels with no segment are included with zero duration.
    pub fn label_durations(&self) -> Vec<(MovementLabel, f64)> {
        MovementLabel::ALL
            .iter()
            .map(|&label| {
                let total: f64 = self
                    .segments
                    .iter()
                    .filter(|s| s.label == label)
                    .map(Segment::duration)
                    .sum();
                (label, total)
            })
            .collect()
    }

    /// Time span from the first to the last sample in milliseconds.
    pub fn timeline_ms(&self) -> f64 {
        match (self.velocities.t.first(), self.velocities.t.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// Run the full analysis on loaded samples.
///
/// # Errors
///
/// Returns an error if the config is invalid or fewer than two samples are given.
pub fn analyze(samples: &[Sample], config: &AnalysisConfig) -> Result<Analysis> {
    config.validate().map_err(AnalysisError::InvalidConfig)?;

    if samples.len() < 2 {
        return Err(AnalysisError::InsufficientSamples {
            found: samples.len(),
        });
    }

    let raw_yaw: Vec<f64> = samples.iter().map(|s| s.yaw).collect();
    let mut yaw = unwrap_angles(&raw_yaw);
    if config.heading_alpha < 1.0 {
        yaw = ema(&yaw, config.heading_alpha);
    }

    let velocities = estimate_velocities(samples, &yaw, config.smoothing_alpha)?;
    let labels = classify_all(&velocities, &Thresholds::from(config));
    let segments = build_segments(&velocities.t, &labels, config.min_segment_ms)?;

    log::info!(
        "Analyzed {} samples into {} segments",
        samples.len(),
        segments.len()
    );

    Ok(Analysis {
        velocities,
        labels,
        segments,
    })
}

/// Load a telemetry CSV and analyze it.
pub fn analyze_csv<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> anyhow::Result<Analysis> {
    let path = path.as_ref();
    let samples = load_telemetry_csv(path)
        .with_context(|| format!("Failed to load telemetry: {}", path.display()))?;
    let analysis = analyze(&samples, config)
        .with_context(|| format!("Failed to analyze telemetry: {}", path.display()))?;
    Ok(analysis)
}

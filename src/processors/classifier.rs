//! Threshold-based movement labeling and segment construction.
//!
//! Each sample gets a label from its three velocities. Consecutive samples
//! with the same label form a run; runs that last at least the minimum
//! duration become [`Segment`]s, shorter runs are dropped and leave a gap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

use super::analysis::{AnalysisError, Result};
use super::velocity::{VelocityFrame, Velocities};

/// Instantaneous motion state of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementLabel {
    Stationary,
    DrivingStraight,
    TurningLeft,
    TurningRight,
    RaisingArm,
    LoweringArm,
}

impl MovementLabel {
    /// All labels in declaration order.
    pub const ALL: [MovementLabel; 6] = [
        MovementLabel::Stationary,
        MovementLabel::DrivingStraight,
        MovementLabel::TurningLeft,
        MovementLabel::TurningRight,
        MovementLabel::RaisingArm,
        MovementLabel::LoweringArm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementLabel::Stationary => "stationary",
            MovementLabel::DrivingStraight => "driving_straight",
            MovementLabel::TurningLeft => "turning_left",
            MovementLabel::TurningRight => "turning_right",
            MovementLabel::RaisingArm => "raising_arm",
            MovementLabel::LoweringArm => "lowering_arm",
        }
    }
}

impl fmt::Display for MovementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Velocity thresholds in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub drive: f64,
    pub arm: f64,
    pub yaw: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for Thresholds {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            drive: config.drive_threshold,
            arm: config.arm_threshold,
            yaw: config.yaw_threshold,
        }
    }
}

/// A labeled time interval in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_t: f64,
    pub end_t: f64,
    pub label: MovementLabel,
}

impl Segment {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_t - self.start_t
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment: {:.2}ms to {:.2}ms - {}",
            self.start_t, self.end_t, self.label
        )
    }
}

/// Label a single sample.
///
/// The arm check runs first and the drive check overwrites it, so a sample
/// where both the arm and the wheels move reports the drive label.
pub fn classify_sample(frame: &VelocityFrame, thresholds: &Thresholds) -> MovementLabel {
    let mut label = MovementLabel::Stationary;

    if frame.arm_v.abs() > thresholds.arm {
        label = if frame.arm_v > 0.0 {
            MovementLabel::RaisingArm
        } else {
            MovementLabel::LoweringArm
        };
    }

    if frame.drive_v.abs() > thresholds.drive {
        label = if frame.yaw_v.abs() > thresholds.yaw {
            if frame.yaw_v > 0.0 {
                MovementLabel::TurningLeft
            } else {
                MovementLabel::TurningRight
            }
        } else {
            MovementLabel::DrivingStraight
        };
    }

    label
}

/// Label every sample.
pub fn classify_all(velocities: &Velocities, thresholds: &Thresholds) -> Vec<MovementLabel> {
    velocities
        .frames()
        .map(|frame| classify_sample(&frame, thresholds))
        .collect()
}

/// Merge per-sample labels into segments.
///
/// A run spans from the timestamp of its first sample to the timestamp of the
/// sample that starts the next run (or the last sample for the final run).
/// Runs shorter than `min_segment_ms`, and zero-length runs, are discarded.
///
/// # Errors
///
/// Returns an error if fewer than two samples are given or `times` and
/// `labels` differ in length.
pub fn build_segments(
    times: &[f64],
    labels: &[MovementLabel],
    min_segment_ms: f64,
) -> Result<Vec<Segment>> {
    if times.len() != labels.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "labels",
            expected: times.len(),
            found: labels.len(),
        });
    }
    if times.len() < 2 {
        return Err(AnalysisError::InsufficientSamples { found: times.len() });
    }

    let mut segments = Vec::new();
    let mut dropped = 0usize;

    let mut emit = |start_t: f64, end_t: f64, label: MovementLabel| {
        let duration = end_t - start_t;
        if duration >= min_segment_ms && duration > 0.0 {
            segments.push(Segment { start_t, end_t, label });
        } else {
            dropped += 1;
        }
    };

    let mut current = labels[0];
    let mut start_t = times[0];

    for (&t, &label) in times.iter().zip(labels).skip(1) {
        if label != current {
            emit(start_t, t, current);
            current = label;
            start_t = t;
        }
    }
    emit(start_t, times[times.len() - 1], current);

    log::debug!(
        "{} segments kept, {} runs under {}ms dropped",
        segments.len(),
        dropped,
        min_segment_ms
    );

    Ok(segments)
}

/// Label every sample and build segments in one step.
pub fn classify_movements(
    velocities: &Velocities,
    thresholds: &Thresholds,
    min_segment_ms: f64,
) -> Result<Vec<Segment>> {
    let labels = classify_all(velocities, thresholds);
    build_segments(&velocities.t, &labels, min_segment_ms)
}

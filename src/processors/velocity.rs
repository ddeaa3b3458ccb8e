//! Finite-difference velocity estimation for drive, arm and heading.
//!
//! Drive velocity is the mean rate of the two wheel motors (A and B), arm
//! velocity the rate of motor C, and yaw rate the rate of the unwrapped
//! heading. All rates are in degrees per second.

use crate::core::loaders::Sample;
use crate::core::transforms::ema;

use super::analysis::{AnalysisError, Result};

/// Velocities of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityFrame {
    pub t: f64,
    pub drive_v: f64,
    pub arm_v: f64,
    pub yaw_v: f64,
}

/// Per-sample velocity channels, index-aligned with the source samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Velocities {
    /// Sample timestamps in milliseconds.
    pub t: Vec<f64>,
    pub drive: Vec<f64>,
    pub arm: Vec<f64>,
    pub yaw: Vec<f64>,
}

impl Velocities {
    /// Creates empty channels with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            t: Vec::with_capacity(capacity),
            drive: Vec::with_capacity(capacity),
            arm: Vec::with_capacity(capacity),
            yaw: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    #[inline]
    pub fn push(&mut self, frame: VelocityFrame) {
        self.t.push(frame.t);
        self.drive.push(frame.drive_v);
        self.arm.push(frame.arm_v);
        self.yaw.push(frame.yaw_v);
    }

    /// Returns the velocities at index `i`.
    #[inline]
    pub fn frame(&self, i: usize) -> VelocityFrame {
        VelocityFrame {
            t: self.t[i],
            drive_v: self.drive[i],
            arm_v: self.arm[i],
            yaw_v: self.yaw[i],
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = VelocityFrame> + '_ {
        (0..self.len()).map(move |i| self.frame(i))
    }

    /// Smooth every channel independently with the same EMA factor.
    pub fn smoothed(&self, alpha: f64) -> Self {
        Self {
            t: self.t.clone(),
            drive: ema(&self.drive, alpha),
            arm: ema(&self.arm, alpha),
            yaw: ema(&self.yaw, alpha),
        }
    }
}

/// Backward-difference velocities without smoothing.
///
/// Index 0 is always zero. Where the time step is zero or negative all three
/// channels are zero at that index.
///
/// # Arguments
///
/// * `samples` - Telemetry samples in recording order (at least two)
/// * `yaw_unwrapped` - Continuous heading, one value per sample
///
/// # Errors
///
/// Returns an error if fewer than two samples are given or the heading
/// sequence length differs from the sample count.
pub fn raw_velocities(samples: &[Sample], yaw_unwrapped: &[f64]) -> Result<Velocities> {
    if samples.len() < 2 {
        return Err(AnalysisError::InsufficientSamples {
            found: samples.len(),
        });
    }
    if yaw_unwrapped.len() != samples.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "unwrapped yaw",
            expected: samples.len(),
            found: yaw_unwrapped.len(),
        });
    }

    let mut out = Velocities::with_capacity(samples.len());
    out.push(VelocityFrame {
        t: samples[0].t,
        drive_v: 0.0,
        arm_v: 0.0,
        yaw_v: 0.0,
    });

    let mut stalled = 0usize;
    for i in 1..samples.len() {
        let (prev, cur) = (&samples[i - 1], &samples[i]);
        let dt = (cur.t - prev.t) / 1000.0;

        if dt <= 0.0 {
            stalled += 1;
            out.push(VelocityFrame {
                t: cur.t,
                drive_v: 0.0,
                arm_v: 0.0,
                yaw_v: 0.0,
            });
            continue;
        }

        let drive_delta = (cur.a_rel() - prev.a_rel()) + (cur.b_rel() - prev.b_rel());
        out.push(VelocityFrame {
            t: cur.t,
            drive_v: drive_delta / (2.0 * dt),
            arm_v: (cur.c_rel() - prev.c_rel()) / dt,
            yaw_v: (yaw_unwrapped[i] - yaw_unwrapped[i - 1]) / dt,
        });
    }

    if stalled > 0 {
        log::debug!("{} samples with non-increasing timestamps, velocity set to 0", stalled);
    }

    Ok(out)
}

/// Backward-difference velocities, each channel EMA-smoothed with `alpha`.
///
/// See [`raw_velocities`] for the differencing rules and errors.
pub fn estimate_velocities(
    samples: &[Sample],
    yaw_unwrapped: &[f64],
    alpha: f64,
) -> Result<Velocities> {
    Ok(raw_velocities(samples, yaw_unwrapped)?.smoothed(alpha))
}

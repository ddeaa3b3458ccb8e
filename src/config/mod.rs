//! Configuration types for the motion pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds and filter settings for movement analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Drive velocity above which the robot counts as moving (deg/s)
    #[serde(default = "default_threshold")]
    pub drive_threshold: f64,

    /// Arm velocity above which the arm counts as moving (deg/s)
    #[serde(default = "default_threshold")]
    pub arm_threshold: f64,

    /// Yaw rate above which a drive counts as a turn (deg/s)
    #[serde(default = "default_threshold")]
    pub yaw_threshold: f64,

    /// EMA factor applied to each velocity channel, in (0, 1]
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f64,

    /// EMA factor applied to the unwrapped heading before differentiation.
    /// 1.0 leaves the heading untouched.
    #[serde(default = "default_heading_alpha")]
    pub heading_alpha: f64,

    /// Runs shorter than this are dropped from the segment list (ms)
    #[serde(default = "default_min_segment_ms")]
    pub min_segment_ms: f64,
}

fn default_threshold() -> f64 {
    12.0
}

fn default_smoothing_alpha() -> f64 {
    0.2
}

fn default_heading_alpha() -> f64 {
    1.0
}

fn default_min_segment_ms() -> f64 {
    200.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            drive_threshold: default_threshold(),
            arm_threshold: default_threshold(),
            yaw_threshold: default_threshold(),
            smoothing_alpha: default_smoothing_alpha(),
            heading_alpha: default_heading_alpha(),
            min_segment_ms: default_min_segment_ms(),
        }
    }
}

impl AnalysisConfig {
    /// Check that every value is usable by the pipeline.
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        for (name, alpha) in [
            ("smoothing_alpha", self.smoothing_alpha),
            ("heading_alpha", self.heading_alpha),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(format!("{} must be in (0, 1], got {}", name, alpha));
            }
        }

        for (name, value) in [
            ("drive_threshold", self.drive_threshold),
            ("arm_threshold", self.arm_threshold),
            ("yaw_threshold", self.yaw_threshold),
            ("min_segment_ms", self.min_segment_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be finite and >= 0, got {}", name, value));
            }
        }

        Ok(())
    }
}

/// Settings for the generated SPIKE replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Motor speed passed to `run_for_degrees` (deg/s)
    #[serde(default = "default_motor_speed")]
    pub motor_speed: i32,

    /// Hub port letters for the A, B and C motor channels
    #[serde(default = "default_ports")]
    pub ports: [char; 3],
}

fn default_motor_speed() -> i32 {
    500
}

fn default_ports() -> [char; 3] {
    ['A', 'B', 'C']
}

impl ReplayConfig {
    /// Check the speed and port letters before a script is rendered.
    pub fn validate(&self) -> Result<(), String> {
        if self.motor_speed <= 0 {
            return Err(format!("motor_speed must be > 0, got {}", self.motor_speed));
        }

        if let Some(port) = self.ports.iter().find(|p| !('A'..='F').contains(*p)) {
            return Err(format!("ports must be hub letters A to F, got '{}'", port));
        }

        Ok(())
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            motor_speed: default_motor_speed(),
            ports: default_ports(),
        }
    }
}

/// Settings for velocity plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "default_plot_width")]
    pub width: u32,

    #[serde(default = "default_plot_height")]
    pub height: u32,
}

fn default_plot_width() -> u32 {
    1600
}

fn default_plot_height() -> u32 {
    900
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub replay: ReplayConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

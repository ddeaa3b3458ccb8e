//! Robot telemetry processing pipeline.
//!
//! This crate provides tools for:
//! - Loading telemetry CSV logs (motor angles plus gyroscope heading)
//! - Unwrapping and smoothing heading and velocity signals
//! - Segmenting a run into labeled movement phases (driving, turning, arm moves)
//! - Generating SPIKE replay scripts from recorded motor positions
//!
//! # Example
//!
//! ```no_run
//! use motion_pipeline::{core::loaders::load_telemetry_csv, processors::analysis::analyze};
//! use motion_pipeline::AnalysisConfig;
//!
//! let samples = load_telemetry_csv("cleaned_data.csv").unwrap();
//! let analysis = analyze(&samples, &AnalysisConfig::default()).unwrap();
//! for segment in &analysis.segments {
//!     println!("{}", segment);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use crate::config::{AnalysisConfig, PipelineConfig, PlotConfig, ReplayConfig};
pub use crate::core::loaders::{MotorSample, Sample};
pub use crate::processors::classifier::{MovementLabel, Segment};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

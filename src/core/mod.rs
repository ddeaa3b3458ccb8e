//! Core data types and I/O operations.

pub mod loaders;
pub mod transforms;
pub mod writers;

pub use loaders::{load_motor_csv, load_telemetry_csv, LoaderError, MotorSample, Sample};
pub use transforms::{ema, unwrap_angles};
pub use writers::{
    format_segment_report, write_segments_csv, write_text_file, write_velocities_csv, WriteError,
};

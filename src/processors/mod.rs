//! Data processing modules.

pub mod analysis;
pub mod classifier;
pub mod cleaning;
pub mod replay;
pub mod velocity;

// Re-export key types for convenience
pub use analysis::{analyze, analyze_csv, Analysis, AnalysisError};
pub use classifier::{
    build_segments, classify_all, classify_movements, classify_sample, MovementLabel, Segment,
    Thresholds,
};
pub use cleaning::{clean_rows, CleanStats, CleaningError};
pub use replay::{build_timeline, generate_replay_script, render_spike_script, ReplayError, ReplayStep};
pub use velocity::{estimate_velocities, raw_velocities, Velocities, VelocityFrame};

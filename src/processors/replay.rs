//! Replay script generation for the SPIKE hub.
//!
//! A recorded motor log becomes a timeline of `(dt, dA, dB, dC)` steps: wait
//! `dt` milliseconds, then turn each motor by its delta in degrees. The
//! timeline is embedded in a SPIKE App Python program that replays it.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::config::ReplayConfig;
use crate::core::loaders::{load_motor_csv, LoaderError, MotorSample};
use crate::core::writers::{write_text_file, WriteError};

/// Imports and banner of the generated program.
const SCRIPT_HEADER: &str = "import runloop
import motor
from hub import port

# Auto-generated SPIKE replay script

";

/// Replay loop up to the per-motor commands.
const SCRIPT_LOOP: &str = "
async def main():
    for dt, da, db, dc in timeline:

        # wait before next move
        if dt > 0:
            await runloop.sleep_ms(dt)

        # run motors (sequential for timing accuracy)
";

const SCRIPT_FOOTER: &str = "
    print(\"Replay complete\")


runloop.run(main())
";

/// Errors that can occur while generating a replay script.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to load motor log: {0}")]
    Load(#[from] LoaderError),

    #[error("no rows loaded, nothing to replay")]
    NoRows,

    #[error("invalid replay config: {0}")]
    InvalidConfig(String),

    #[error("failed to write replay script: {0}")]
    Write(#[from] WriteError),
}

/// Result type for replay operations.
pub type Result<T> = std::result::Result<T, ReplayError>;

/// One replay step: wait `dt` ms, then move each motor by its delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStep {
    pub dt: i64,
    pub delta_a: i64,
    pub delta_b: i64,
    pub delta_c: i64,
}

impl ReplayStep {
    /// True when no motor moves in this step.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.delta_a == 0 && self.delta_b == 0 && self.delta_c == 0
    }
}

impl fmt::Display for ReplayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.dt, self.delta_a, self.delta_b, self.delta_c
        )
    }
}

/// Difference consecutive rows into replay steps.
///
/// A single row yields an empty timeline.
///
/// # Errors
///
/// Returns [`ReplayError::NoRows`] for empty input.
pub fn build_timeline(rows: &[MotorSample]) -> Result<Vec<ReplayStep>> {
    if rows.is_empty() {
        return Err(ReplayError::NoRows);
    }

    Ok(rows
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            ReplayStep {
                dt: cur.t - prev.t,
                delta_a: cur.a_rel - prev.a_rel,
                delta_b: cur.b_rel - prev.b_rel,
                delta_c: cur.c_rel - prev.c_rel,
            }
        })
        .collect())
}

/// Render the SPIKE App Python program for a timeline.
///
/// Motors run one after another within a step; a zero delta skips that motor
/// and a non-positive `dt` skips the wait.
pub fn render_spike_script(timeline: &[ReplayStep], config: &ReplayConfig) -> String {
    let mut script = String::with_capacity(512 + timeline.len() * 24);
    script.push_str(SCRIPT_HEADER);

    if timeline.is_empty() {
        script.push_str("timeline = []\n");
    } else {
        script.push_str("timeline = [\n");
        for step in timeline {
            script.push_str(&format!("    {},\n", step));
        }
        script.push_str("]\n");
    }

    script.push_str(SCRIPT_LOOP);
    let [port_a, port_b, port_c] = config.ports;
    for (var, port) in [("da", port_a), ("db", port_b), ("dc", port_c)] {
        script.push_str(&format!("        if {} != 0:\n", var));
        script.push_str(&format!(
            "            await motor.run_for_degrees(port.{}, {}, {})\n",
            port, var, config.motor_speed
        ));
    }
    script.push_str(SCRIPT_FOOTER);

    script
}

/// Load a motor log, build its timeline and write the replay script.
///
/// # Arguments
///
/// * `input` - Motor CSV (4-column export or full telemetry log)
/// * `output` - Path of the Python script to write
/// * `config` - Motor speed and port mapping
///
/// # Returns
///
/// The number of replay steps written.
///
/// # Errors
///
/// Returns an error if the config is invalid, the log cannot be loaded (an
/// empty log surfaces as [`LoaderError::EmptyFile`]) or the script cannot be
/// written.
pub fn generate_replay_script(input: &Path, output: &Path, config: &ReplayConfig) -> Result<usize> {
    config.validate().map_err(ReplayError::InvalidConfig)?;

    let rows = load_motor_csv(input)?;
    let timeline = build_timeline(&rows)?;

    let idle = timeline.iter().filter(|s| s.is_idle()).count();
    log::info!(
        "{}: {} replay steps ({} idle)",
        input.display(),
        timeline.len(),
        idle
    );

    let script = render_spike_script(&timeline, config);
    write_text_file(output, &script)?;
    log::info!("Replay script -> {}", output.display());

    Ok(timeline.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn row(t: i64, a: i64, b: i64, c: i64) -> MotorSample {
        MotorSample {
            t,
            a_rel: a,
            b_rel: b,
            c_rel: c,
        }
    }

    #[test]
    fn test_build_timeline() {
        let rows = [row(0, 0, 0, 0), row(150, 10, -5, 0), row(290, 10, 20, 90)];
        let timeline = build_timeline(&rows).unwrap();

        assert_eq!(
            timeline,
            vec![
                ReplayStep {
                    dt: 150,
                    delta_a: 10,
                    delta_b: -5,
                    delta_c: 0
                },
                ReplayStep {
                    dt: 140,
                    delta_a: 0,
                    delta_b: 25,
                    delta_c: 90
                },
            ]
        );
    }

    #[test]
    fn test_build_timeline_edge_cases() {
        assert!(matches!(build_timeline(&[]), Err(ReplayError::NoRows)));
        assert!(build_timeline(&[row(0, 1, 2, 3)]).unwrap().is_empty());
    }

    #[test]
    fn test_render_spike_script() {
        let timeline = [
            ReplayStep {
                dt: 150,
                delta_a: 10,
                delta_b: -5,
                delta_c: 0,
            },
            ReplayStep {
                dt: 0,
                delta_a: 0,
                delta_b: 0,
                delta_c: 0,
            },
        ];
        let script = render_spike_script(&timeline, &ReplayConfig::default());

        assert!(script.starts_with("import runloop\nimport motor\nfrom hub import port\n"));
        assert!(script.contains("    (150, 10, -5, 0),\n"));
        assert!(script.contains("    (0, 0, 0, 0),\n"));
        assert!(script.contains("await motor.run_for_degrees(port.A, da, 500)"));
        assert!(script.contains("await motor.run_for_degrees(port.C, dc, 500)"));
        assert!(script.contains("        if db != 0:\n"));
        assert!(script.contains("        if dt > 0:\n"));
        assert!(script.trim_end().ends_with("runloop.run(main())"));
    }

    #[test]
    fn test_render_custom_ports_and_speed() {
        let config = ReplayConfig {
            motor_speed: 720,
            ports: ['E', 'F', 'D'],
        };
        let script = render_spike_script(&[], &config);

        assert!(script.contains("timeline = []\n"));
        assert!(script.contains("run_for_degrees(port.E, da, 720)"));
        assert!(script.contains("run_for_degrees(port.F, db, 720)"));
        assert!(script.contains("run_for_degrees(port.D, dc, 720)"));
    }

    #[test]
    fn test_generate_replay_script() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "time_ms,motorA_rel_deg,motorB_rel_deg,motorC_rel_deg").unwrap();
        writeln!(input, "0,0,0,0").unwrap();
        writeln!(input, "150,30,30,0").unwrap();
        writeln!(input, "#recording_stopped").unwrap();
        writeln!(input, "300,60,45,-10").unwrap();
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let output = dir.path().join("out").join("generated_spike.py");

        let steps = generate_replay_script(input.path(), &output, &ReplayConfig::default()).unwrap();
        assert_eq!(steps, 2);

        let script = fs::read_to_string(&output).unwrap();
        assert!(script.contains("    (150, 30, 30, 0),\n"));
        assert!(script.contains("    (150, 30, 15, -10),\n"));
    }

    #[test]
    fn test_generate_replay_script_header_only() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "time_ms,motorA_rel_deg,motorB_rel_deg,motorC_rel_deg").unwrap();
        writeln!(input, "#recording_stopped").unwrap();
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let result = generate_replay_script(
            input.path(),
            &dir.path().join("x.py"),
            &ReplayConfig::default(),
        );
        assert!(matches!(
            result,
            Err(ReplayError::Load(LoaderError::EmptyFile(_)))
        ));
    }

    #[test]
    fn test_generate_replay_script_rejects_infinite_angle() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "time_ms,motorA_rel_deg,motorB_rel_deg,motorC_rel_deg").unwrap();
        writeln!(input, "0,-inf,0,0").unwrap();
        writeln!(input, "100,10,0,0").unwrap();
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let result = generate_replay_script(
            input.path(),
            &dir.path().join("x.py"),
            &ReplayConfig::default(),
        );
        assert!(matches!(
            result,
            Err(ReplayError::Load(LoaderError::InvalidValue { line: 2, .. }))
        ));
    }

    #[test]
    fn test_generate_replay_script_rejects_invalid_config() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "time_ms,motorA_rel_deg,motorB_rel_deg,motorC_rel_deg").unwrap();
        writeln!(input, "0,0,0,0").unwrap();
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let output = dir.path().join("x.py");
        let config = ReplayConfig {
            motor_speed: 0,
            ..ReplayConfig::default()
        };

        let result = generate_replay_script(input.path(), &output, &config);
        assert!(matches!(result, Err(ReplayError::InvalidConfig(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_generate_replay_script_missing_columns() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "time_ms,motorA_rel_deg").unwrap();
        writeln!(input, "0,0").unwrap();
        input.flush().unwrap();

        let dir = tempdir().unwrap();
        let result = generate_replay_script(
            input.path(),
            &dir.path().join("x.py"),
            &ReplayConfig::default(),
        );
        assert!(matches!(
            result,
            Err(ReplayError::Load(LoaderError::MissingColumns(_)))
        ));
    }
}

//! Command-line interface for the motion pipeline.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{AnalysisConfig, ReplayConfig};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "motion-pipeline")]
#[command(about = "Robot telemetry segmentation and replay script generation", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Analysis parameters that override the config file.
#[derive(clap::Args, Debug, Default)]
struct AnalysisArgs {
    /// Drive velocity threshold (deg/s)
    #[arg(long)]
    drive_threshold: Option<f64>,
    /// Arm velocity threshold (deg/s)
    #[arg(long)]
    arm_threshold: Option<f64>,
    /// Yaw rate threshold (deg/s)
    #[arg(long)]
    yaw_threshold: Option<f64>,
    /// EMA smoothing factor for velocities, in (0, 1]
    #[arg(long)]
    alpha: Option<f64>,
    /// EMA smoothing factor for heading, in (0, 1]
    #[arg(long)]
    heading_alpha: Option<f64>,
    /// Minimum segment duration (ms)
    #[arg(long)]
    min_segment_ms: Option<f64>,
}

impl AnalysisArgs {
    fn apply(&self, base: &AnalysisConfig) -> AnalysisConfig {
        AnalysisConfig {
            drive_threshold: self.drive_threshold.unwrap_or(base.drive_threshold),
            arm_threshold: self.arm_threshold.unwrap_or(base.arm_threshold),
            yaw_threshold: self.yaw_threshold.unwrap_or(base.yaw_threshold),
            smoothing_alpha: self.alpha.unwrap_or(base.smoothing_alpha),
            heading_alpha: self.heading_alpha.unwrap_or(base.heading_alpha),
            min_segment_ms: self.min_segment_ms.unwrap_or(base.min_segment_ms),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a telemetry CSV into labeled movement phases
    Analyze {
        /// Telemetry CSV file
        input: PathBuf,
        #[command(flatten)]
        params: AnalysisArgs,
        /// Write segments to this CSV file
        #[arg(long)]
        segments_csv: Option<PathBuf>,
        /// Write per-sample velocities and labels to this CSV file
        #[arg(long)]
        velocities_csv: Option<PathBuf>,
    },

    /// Generate a SPIKE replay script from a motor log
    Replay {
        /// Motor CSV (time and relative angle of motors A, B, C)
        input: PathBuf,
        /// Output Python script
        #[arg(short, long, default_value = "generated_spike.py")]
        output: PathBuf,
        /// Motor speed for every move (deg/s)
        #[arg(long)]
        speed: Option<i32>,
    },

    /// Remove blank rows from a CSV captured from the hub console
    Clean {
        /// Raw CSV file
        input: PathBuf,
        /// Cleaned CSV file
        output: PathBuf,
    },

    /// Plot velocity channels and segments as PNG
    Plot {
        /// Telemetry CSV file
        input: PathBuf,
        /// Output PNG file path (defaults to same name as input with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        params: AnalysisArgs,
    },

    /// Write the default configuration to a YAML file
    InitConfig {
        /// Destination YAML file
        path: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 38 {
            let head: String = value.chars().take(35).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<38} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Analyze { input, params, segments_csv, velocities_csv } => {
            let analysis_config = params.apply(&config.analysis);
            cmd_analyze(&input, &analysis_config, segments_csv, velocities_csv);
        }
        Commands::Replay { input, output, speed } => {
            let replay_config = ReplayConfig {
                motor_speed: speed.unwrap_or(config.replay.motor_speed),
                ..config.replay.clone()
            };
            cmd_replay(&input, &output, &replay_config);
        }
        Commands::Clean { input, output } => {
            cmd_clean(&input, &output);
        }
        Commands::Plot { input, output, params } => {
            let analysis_config = params.apply(&config.analysis);
            cmd_plot(&input, output, &analysis_config, &config);
        }
        Commands::InitConfig { path } => {
            cmd_init_config(&path, &config);
        }
    }
}

fn cmd_analyze(
    input: &PathBuf,
    config: &AnalysisConfig,
    segments_csv: Option<PathBuf>,
    velocities_csv: Option<PathBuf>,
) {
    use crate::core::writers;
    use crate::processors::analysis;

    let start = Instant::now();

    let spinner = create_spinner("Analyzing telemetry...");

    let result = analysis::analyze_csv(input, config);

    spinner.finish_and_clear();

    let analysis = match result {
        Ok(a) => a,
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            std::process::exit(1);
        }
    };

    print!("{}", writers::format_segment_report(&analysis.segments));

    if let Some(path) = &segments_csv {
        if let Err(e) = writers::write_segments_csv(path, &analysis.segments) {
            error!("Failed to write segments: {}", e);
            std::process::exit(1);
        }
        info!("Segments CSV -> {}", path.display());
    }

    if let Some(path) = &velocities_csv {
        if let Err(e) = writers::write_velocities_csv(path, &analysis.velocities, &analysis.labels) {
            error!("Failed to write velocities: {}", e);
            std::process::exit(1);
        }
        info!("Velocities CSV -> {}", path.display());
    }

    let mut items = vec![
        ("Input file", input.display().to_string()),
        ("Samples", analysis.sample_count().to_string()),
        ("Timeline", format!("{:.0} ms", analysis.timeline_ms())),
        ("Segments", analysis.segments.len().to_string()),
    ];
    for (label, total) in analysis.label_durations() {
        if total > 0.0 {
            items.push((label.as_str(), format!("{:.0} ms", total)));
        }
    }
    items.push(("Duration", format!("{:.2?}", start.elapsed())));

    print_summary("Movement Analysis Complete", &items);
}

fn cmd_replay(input: &PathBuf, output: &PathBuf, config: &ReplayConfig) {
    use crate::processors::replay;

    let start = Instant::now();

    println!("Generating replay script...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    match replay::generate_replay_script(input, output, config) {
        Ok(steps) => {
            print_summary(
                "Replay Script Generated",
                &[
                    ("Input file", input.display().to_string()),
                    ("Output script", output.display().to_string()),
                    ("Steps", steps.to_string()),
                    ("Motor speed", config.motor_speed.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            error!("Replay generation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_clean(input: &PathBuf, output: &PathBuf) {
    use crate::processors::cleaning;

    let start = Instant::now();

    match cleaning::clean_rows(input, output) {
        Ok(stats) => {
            print_summary(
                "Clean Complete",
                &[
                    ("Input file", input.display().to_string()),
                    ("Output file", output.display().to_string()),
                    ("Rows kept", stats.kept.to_string()),
                    ("Blank rows dropped", stats.dropped.to_string()),
                    ("Comment rows", stats.comments.to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            error!("Cleaning failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_plot(
    input: &PathBuf,
    output: Option<PathBuf>,
    analysis_config: &AnalysisConfig,
    config: &PipelineConfig,
) {
    use crate::processors::analysis;
    use crate::visualization;

    let start = Instant::now();

    // Determine output path (default to same name as input with .png extension)
    let output_path = output.unwrap_or_else(|| {
        let mut path = input.clone();
        path.set_extension("png");
        path
    });

    println!("Plotting velocities...");
    println!("Input: {}", input.display());
    println!("Output: {}", output_path.display());

    let spinner = create_spinner("Analyzing telemetry...");

    let analysis = match analysis::analyze_csv(input, analysis_config) {
        Ok(a) => a,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Analysis failed: {:#}", e);
            std::process::exit(1);
        }
    };

    spinner.set_message("Generating plot...");

    match visualization::plot_velocities(&output_path, &analysis, &config.plot) {
        Ok(()) => {
            spinner.finish_and_clear();

            print_summary(
                "Plot Complete",
                &[
                    ("Input file", input.display().to_string()),
                    ("Output PNG", output_path.display().to_string()),
                    ("Samples", analysis.sample_count().to_string()),
                    ("Segments", analysis.segments.len().to_string()),
                    ("Duration", format!("{:.2?}", start.elapsed())),
                ],
            );
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Plotting failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_init_config(path: &PathBuf, config: &PipelineConfig) {
    match config.to_yaml(path) {
        Ok(()) => println!("Wrote configuration to {}", path.display()),
        Err(e) => {
            error!("Failed to write config to {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_args_override_config() {
        let base = AnalysisConfig::default();
        let args = AnalysisArgs {
            arm_threshold: Some(30.0),
            alpha: Some(0.5),
            ..AnalysisArgs::default()
        };

        let merged = args.apply(&base);
        assert_eq!(merged.arm_threshold, 30.0);
        assert_eq!(merged.smoothing_alpha, 0.5);
        assert_eq!(merged.drive_threshold, base.drive_threshold);
        assert_eq!(merged.min_segment_ms, base.min_segment_ms);
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from([
            "motion-pipeline",
            "-v",
            "analyze",
            "run.csv",
            "--yaw-threshold",
            "20",
            "--min-segment-ms",
            "300",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Analyze { input, params, segments_csv, .. } => {
                assert_eq!(input, PathBuf::from("run.csv"));
                assert_eq!(params.yaw_threshold, Some(20.0));
                assert_eq!(params.min_segment_ms, Some(300.0));
                assert!(segments_csv.is_none());
            }
            _ => panic!("Expected analyze command"),
        }
    }

    #[test]
    fn test_cli_parses_replay_defaults() {
        let cli = Cli::try_parse_from(["motion-pipeline", "replay", "cleaned_data.csv"]).unwrap();
        match cli.command {
            Commands::Replay { output, speed, .. } => {
                assert_eq!(output, PathBuf::from("generated_spike.py"));
                assert!(speed.is_none());
            }
            _ => panic!("Expected replay command"),
        }
    }
}

//! Visualization tools for velocity channels and movement segments.
//!
//! This module renders a PNG line chart of drive, arm and yaw velocities over
//! time using the plotters library, with the segment timeline drawn as a
//! colored band under the curves.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::processors::analysis::Analysis;
use crate::processors::classifier::MovementLabel;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    EmptyInput,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

const DRIVE_COLOR: RGBColor = RGBColor(55, 126, 184); // Blue
const ARM_COLOR: RGBColor = RGBColor(77, 175, 74); // Green
const YAW_COLOR: RGBColor = RGBColor(255, 127, 0); // Orange

/// Band color for each movement label.
fn label_color(label: MovementLabel) -> RGBColor {
    match label {
        MovementLabel::Stationary => RGBColor(153, 153, 153),      // Gray
        MovementLabel::DrivingStraight => RGBColor(55, 126, 184),  // Blue
        MovementLabel::TurningLeft => RGBColor(152, 78, 163),      // Purple
        MovementLabel::TurningRight => RGBColor(247, 129, 191),    // Pink
        MovementLabel::RaisingArm => RGBColor(77, 175, 74),        // Green
        MovementLabel::LoweringArm => RGBColor(228, 26, 28),       // Red
    }
}

/// Plot velocity channels and segments of an analysis and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `analysis` - Result of a pipeline run
/// * `config` - Image size
pub fn plot_velocities(output_path: &Path, analysis: &Analysis, config: &PlotConfig) -> Result<()> {
    let v = &analysis.velocities;
    if v.is_empty() {
        return Err(VisualizationError::EmptyInput);
    }

    let (t_min, t_max, v_min, v_max) = compute_bounds(&v.t, [&v.drive, &v.arm, &v.yaw]);
    let v_padding = (v_max - v_min) * 0.05;

    // Segment band sits under the curves
    let band_height = (v_max - v_min) * 0.08;
    let band_top = v_min - v_padding;
    let band_bottom = band_top - band_height;

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(t_min..t_max, band_bottom..(v_max + v_padding))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    for (values, color) in [(&v.drive, DRIVE_COLOR), (&v.arm, ARM_COLOR), (&v.yaw, YAW_COLOR)] {
        chart
            .draw_series(LineSeries::new(
                v.t.iter().copied().zip(values.iter().copied()),
                color.stroke_width(2),
            ))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    chart
        .draw_series(analysis.segments.iter().map(|s| {
            Rectangle::new(
                [(s.start_t, band_bottom), (s.end_t, band_top)],
                label_color(s.label).filled(),
            )
        }))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    log::info!("Velocity plot -> {}", output_path.display());
    Ok(())
}

/// Compute the time range and the value range over all channels.
fn compute_bounds(t: &[f64], channels: [&Vec<f64>; 3]) -> (f64, f64, f64, f64) {
    let mut t_min = f64::MAX;
    let mut t_max = f64::MIN;
    let mut v_min = f64::MAX;
    let mut v_max = f64::MIN;

    for &x in t {
        if x < t_min { t_min = x; }
        if x > t_max { t_max = x; }
    }
    for &y in channels.iter().flat_map(|c| c.iter()) {
        if y < v_min { v_min = y; }
        if y > v_max { v_max = y; }
    }

    if (t_max - t_min).abs() < f64::EPSILON {
        t_min -= 1.0;
        t_max += 1.0;
    }
    if (v_max - v_min).abs() < f64::EPSILON {
        v_min -= 1.0;
        v_max += 1.0;
    }

    (t_min, t_max, v_min, v_max)
}

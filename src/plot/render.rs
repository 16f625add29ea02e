//! PNG rendering with plotters.
//!
//! Uses the bitmap backend only, so saving an image never needs a display.

use super::PlotData;
use crate::error::{LcError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingErrorKind;
use std::path::Path;
use tracing::{debug, warn};

const POINT_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Figure geometry and marker styling.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Figure width in inches.
    pub width_in: f64,
    /// Figure height in inches.
    pub height_in: f64,
    pub dpi: u32,
    /// Marker radius in pixels.
    pub marker_radius: u32,
    /// Total width of the error-bar caps in pixels.
    pub cap_width: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width_in: 12.0,
            height_in: 3.0,
            dpi: 150,
            marker_radius: 3,
            cap_width: 8,
        }
    }
}

impl PlotOptions {
    /// Image size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        )
    }

    fn font_size(&self) -> u32 {
        // 10pt text
        (10.0 * f64::from(self.dpi) / 72.0).round() as u32
    }
}

/// File name the plot of `source_id` is saved under.
pub fn image_filename(source_id: i64) -> String {
    format!("Vv2_KsLC_{source_id}.png")
}

/// Renders the lightcurve to a PNG file at `path`.
///
/// An empty lightcurve produces an empty, axis-only plot.
pub fn render_png(data: &PlotData, path: &Path, options: &PlotOptions) -> Result<()> {
    let root = BitMapBackend::new(path, options.pixel_size()).into_drawing_area();
    draw(&root, data, options)?;
    root.present().map_err(plot_error)?;

    debug!("Wrote {} points to {}", data.points.len(), path.display());
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &PlotData,
    options: &PlotOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_error)?;

    let font_size = options.font_size();
    let (x0, x1) = data.x_range();
    let (y0, y1) = data.y_range();

    // Magnitudes are negated so the faint end is at the bottom.
    let mut chart = ChartBuilder::on(root)
        .margin(font_size / 2)
        .x_label_area_size(font_size * 3)
        .y_label_area_size(font_size * 4)
        .build_cartesian_2d(x0..x1, -y1..-y0)
        .map_err(plot_error)?;

    let y_formatter = |v: &f64| format!("{:.2}", -v);
    let labelled = chart
        .configure_mesh()
        .x_desc(data.x_label.as_str())
        .y_desc(data.y_label.as_str())
        .y_label_formatter(&y_formatter)
        .label_style(("sans-serif", font_size))
        .axis_desc_style(("sans-serif", font_size))
        .draw();

    match labelled {
        Ok(()) => {}
        Err(e) if is_font_error(&e) => {
            warn!("No usable font ({}), drawing the plot without axis labels", e);
            chart
                .configure_mesh()
                .x_labels(0)
                .y_labels(0)
                .draw()
                .map_err(plot_error)?;
        }
        Err(e) => return Err(plot_error(e)),
    }

    let style = POINT_COLOR.stroke_width(1);

    chart
        .draw_series(data.points.iter().filter_map(|p| {
            p.error.map(|e| {
                ErrorBar::new_vertical(
                    p.time,
                    -(p.magnitude + e),
                    -p.magnitude,
                    -(p.magnitude - e),
                    style,
                    options.cap_width,
                )
            })
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(data.points.iter().map(|p| {
            Circle::new(
                (p.time, -p.magnitude),
                options.marker_radius,
                POINT_COLOR.filled(),
            )
        }))
        .map_err(plot_error)?;

    Ok(())
}

fn is_font_error<E: std::error::Error + Send + Sync>(error: &DrawingAreaErrorKind<E>) -> bool {
    matches!(
        error,
        DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(_))
    )
}

fn plot_error<E: std::error::Error + Send + Sync>(error: DrawingAreaErrorKind<E>) -> LcError {
    LcError::plot(error.to_string())
}

//! Lightcurve presentation.
//!
//! Builds the display axis, then renders an error-bar plot of magnitude
//! against time either to a PNG file (`render`) or interactively in the
//! terminal (`terminal`). Magnitudes are drawn with the axis inverted, so
//! brighter detections sit higher.

mod axis;
mod render;
pub mod terminal;

pub use axis::{fold, AxisMode, DisplayAxis};
pub use render::{image_filename, render_png, PlotOptions};

use crate::lightcurve::LightcurveRecord;

/// Label of the magnitude axis.
pub const MAGNITUDE_LABEL: &str = "Ks  /  mag";

/// One plotted detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub time: f64,
    pub magnitude: f64,
    /// `None` when the error is NaN or infinite.
    pub error: Option<f64>,
}

/// Everything a renderer needs, detached from the record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub source_id: i64,
    pub points: Vec<PlotPoint>,
    pub x_label: String,
    pub y_label: String,
}

impl PlotData {
    /// Pairs the display axis with the record's photometry.
    ///
    /// Detections with a non-finite time or magnitude are left out.
    pub fn new(record: &LightcurveRecord, axis: DisplayAxis) -> Self {
        let points = axis
            .time
            .iter()
            .zip(&record.magnitude)
            .zip(&record.magnitude_error)
            .filter(|((t, m), _)| t.is_finite() && m.is_finite())
            .map(|((&time, &magnitude), &error)| PlotPoint {
                time,
                magnitude,
                error: (error.is_finite()).then_some(error.abs()),
            })
            .collect();

        Self {
            source_id: record.source_id(),
            points,
            x_label: axis.label,
            y_label: MAGNITUDE_LABEL.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Padded time range.
    pub fn x_range(&self) -> (f64, f64) {
        padded_range(self.points.iter().map(|p| p.time))
    }

    /// Padded magnitude range including error bars, faint end last.
    pub fn y_range(&self) -> (f64, f64) {
        padded_range(self.points.iter().flat_map(|p| {
            let e = p.error.unwrap_or(0.0);
            [p.magnitude - e, p.magnitude + e]
        }))
    }
}

/// Range of `values` padded by 5% each side.
///
/// A single distinct value is widened by 0.5 each side and no values at all
/// give `(0, 1)`.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let bounds = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });

    match bounds {
        None => (0.0, 1.0),
        Some((lo, hi)) if hi - lo <= f64::EPSILON * lo.abs().max(1.0) => (lo - 0.5, hi + 0.5),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
    }
}

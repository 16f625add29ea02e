//! Display time axis: phase folding and shifting.
//!
//! The record is never modified; each mode derives a separate display array.

use crate::error::{LcError, Result};
use crate::lightcurve::LightcurveRecord;
use tracing::warn;

/// How the time axis is presented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisMode {
    /// Time modulo the given period (same unit as the record).
    Fold(f64),
    /// Time relative to the earliest detection with a valid error.
    Shift,
    /// Time as stored.
    Raw,
}

impl AxisMode {
    /// Picks the mode from command-line style options.
    ///
    /// A positive fold period takes precedence over shifting. Any other
    /// non-zero period leaves folding off.
    pub fn from_options(fold: f64, shift: bool) -> Self {
        if fold > 0.0 && fold.is_finite() {
            return Self::Fold(fold);
        }
        if fold != 0.0 {
            warn!("Ignoring fold period {}: it must be a positive number", fold);
        }

        if shift {
            Self::Shift
        } else {
            Self::Raw
        }
    }
}

/// Time values and axis label ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayAxis {
    pub time: Vec<f64>,
    pub label: String,
    /// Offset subtracted in shift mode.
    pub shift: Option<f64>,
}

impl DisplayAxis {
    pub fn compute(record: &LightcurveRecord, mode: AxisMode) -> Result<Self> {
        let unit = record.time_unit();

        match mode {
            AxisMode::Fold(period) => Ok(Self {
                time: fold(&record.time, period),
                label: format!("t, phase folded (period {period:.3}) /  {unit}"),
                shift: None,
            }),
            AxisMode::Shift => {
                let shift = first_valid_time(record)?;
                Ok(Self {
                    time: record.time.iter().map(|t| t - shift).collect(),
                    label: format!("t - {shift:.2}  /  {unit}"),
                    shift: Some(shift),
                })
            }
            AxisMode::Raw => Ok(Self {
                time: record.time.clone(),
                label: format!("t  /  {unit}"),
                shift: None,
            }),
        }
    }
}

/// Folds times onto `[0, period)`.
pub fn fold(time: &[f64], period: f64) -> Vec<f64> {
    time.iter().map(|t| t.rem_euclid(period)).collect()
}

/// Earliest time among detections whose magnitude error is not NaN.
fn first_valid_time(record: &LightcurveRecord) -> Result<f64> {
    record
        .time
        .iter()
        .zip(&record.magnitude_error)
        .filter(|(t, e)| !e.is_nan() && !t.is_nan())
        .map(|(t, _)| *t)
        .reduce(f64::min)
        .ok_or_else(|| {
            LcError::computation(format!(
                "Cannot shift the time axis of source {}: no detection has a valid magnitude error",
                record.source_id()
            ))
        })
}

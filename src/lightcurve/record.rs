//! The per-source lightcurve record.

use super::sql::LightcurveQuery;
use super::time::{mjd_to_jyear, TimeUnit};
use crate::db::{self, ColumnSet, DatabaseClient};
use crate::error::{LcError, Result};
use tracing::debug;

/// Time-series photometry of one source, one entry per detection epoch.
///
/// All per-epoch vectors share the same length and index `i` refers to the
/// same detection in each of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LightcurveRecord {
    source_id: i64,
    time_unit: TimeUnit,

    /// Observation time (`mjdobs`), in `time_unit`.
    pub time: Vec<f64>,
    /// Ks magnitude (`mag`).
    pub magnitude: Vec<f64>,
    /// Magnitude uncertainty (`emag`); NaN where unmeasured.
    pub magnitude_error: Vec<f64>,
    /// Detector x position (`x`).
    pub x: Vec<f64>,
    /// Detector y position (`y`).
    pub y: Vec<f64>,
    /// Detection identifier (`detid`).
    pub detection_id: Vec<i64>,
    /// Catalogue identifier (`catid`).
    pub catalog_id: Vec<i64>,
    /// DoPHOT object type (`dp_objtype`).
    pub object_type: Vec<i64>,
    /// DoPHOT chi (`dp_chi`).
    pub chi: Vec<f64>,
    /// Extinction flag (`ext`).
    pub extinction_flag: Vec<i64>,
    /// Pixel confidence (`pxl_cnf`).
    pub pixel_confidence: Vec<f64>,
    /// Sky level (`sky`).
    pub sky: Vec<f64>,
}

/// Compact description of a record, for logs.
#[derive(Debug, Clone, PartialEq)]
pub struct LightcurveSummary {
    pub epoch_count: usize,
    pub valid_errors: usize,
    /// Earliest and latest finite time.
    pub time_span: Option<(f64, f64)>,
    /// Brightest and faintest finite magnitude.
    pub magnitude_range: Option<(f64, f64)>,
}

impl LightcurveRecord {
    /// Fetches the lightcurve of `source_id` from the `virac_lc` table.
    pub async fn fetch(source_id: i64, client: &dyn DatabaseClient) -> Result<Self> {
        Self::fetch_with(LightcurveQuery::new(), source_id, client).await
    }

    /// Fetches the lightcurve of `source_id` with a customised query.
    pub async fn fetch_with(
        query: LightcurveQuery<'_>,
        source_id: i64,
        client: &dyn DatabaseClient,
    ) -> Result<Self> {
        let sql = query.build(source_id)?;
        debug!("Lightcurve query: {}", sql);

        let columns = db::query(&sql, client).await?;
        Self::from_columns(source_id, &columns)
    }

    /// Populates a record from the result of the lightcurve query.
    ///
    /// A source with no detections is a valid, empty record.
    pub fn from_columns(source_id: i64, columns: &ColumnSet) -> Result<Self> {
        let record = Self {
            source_id,
            time_unit: TimeUnit::JulianDays,
            time: columns.floats("mjdobs")?,
            magnitude: columns.floats("mag")?,
            magnitude_error: columns.floats("emag")?,
            x: columns.floats("x")?,
            y: columns.floats("y")?,
            detection_id: columns.ints("detid")?,
            catalog_id: columns.ints("catid")?,
            object_type: columns.ints("dp_objtype")?,
            chi: columns.floats("dp_chi")?,
            extinction_flag: columns.ints("ext")?,
            pixel_confidence: columns.floats("pxl_cnf")?,
            sky: columns.floats("sky")?,
        };

        record.check_aligned()?;
        Ok(record)
    }

    /// Builds a record from the photometric columns alone.
    ///
    /// The remaining per-epoch fields are filled with NaN or zero.
    pub fn from_photometry(
        source_id: i64,
        time: Vec<f64>,
        magnitude: Vec<f64>,
        magnitude_error: Vec<f64>,
    ) -> Result<Self> {
        let n = magnitude.len();
        let record = Self {
            source_id,
            time_unit: TimeUnit::JulianDays,
            time,
            magnitude,
            magnitude_error,
            x: vec![f64::NAN; n],
            y: vec![f64::NAN; n],
            detection_id: vec![0; n],
            catalog_id: vec![0; n],
            object_type: vec![0; n],
            chi: vec![f64::NAN; n],
            extinction_flag: vec![0; n],
            pixel_confidence: vec![f64::NAN; n],
            sky: vec![f64::NAN; n],
        };

        record.check_aligned()?;
        Ok(record)
    }

    pub fn source_id(&self) -> i64 {
        self.source_id
    }

    /// Number of detections, taken from the magnitude array.
    pub fn epoch_count(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epoch_count() == 0
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    /// Converts the time axis from Modified Julian Days to Julian years.
    ///
    /// Fails without touching the data if the record is already in years.
    pub fn to_years(&mut self) -> Result<()> {
        if self.time_unit == TimeUnit::JulianYears {
            return Err(LcError::computation(format!(
                "Lightcurve of source {} is already in {}",
                self.source_id, self.time_unit
            )));
        }

        for t in &mut self.time {
            *t = mjd_to_jyear(*t);
        }
        self.time_unit = TimeUnit::JulianYears;
        Ok(())
    }

    pub fn summary(&self) -> LightcurveSummary {
        LightcurveSummary {
            epoch_count: self.epoch_count(),
            valid_errors: self.magnitude_error.iter().filter(|e| !e.is_nan()).count(),
            time_span: finite_range(&self.time),
            magnitude_range: finite_range(&self.magnitude),
        }
    }

    fn check_aligned(&self) -> Result<()> {
        let n = self.epoch_count();
        let lengths = [
            ("time", self.time.len()),
            ("magnitude_error", self.magnitude_error.len()),
            ("x", self.x.len()),
            ("y", self.y.len()),
            ("detection_id", self.detection_id.len()),
            ("catalog_id", self.catalog_id.len()),
            ("object_type", self.object_type.len()),
            ("chi", self.chi.len()),
            ("extinction_flag", self.extinction_flag.len()),
            ("pixel_confidence", self.pixel_confidence.len()),
            ("sky", self.sky.len()),
        ];

        match lengths.iter().find(|(_, len)| *len != n) {
            Some((field, len)) => Err(LcError::query(format!(
                "Lightcurve of source {}: {field} has {len} epochs, magnitude has {n}",
                self.source_id
            ))),
            None => Ok(()),
        }
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

//! Time-axis units and conversions.

use std::fmt;

/// Offset between Julian Date and Modified Julian Date.
pub const MJD_ZERO_JD: f64 = 2_400_000.5;

/// Julian Date of the J2000.0 epoch.
pub const J2000_JD: f64 = 2_451_545.0;

/// Length of a Julian year in days.
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Unit of a lightcurve's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    /// Modified Julian Days, as stored in the database.
    #[default]
    JulianDays,
    /// Decimal Julian years (epochs such as 2012.5).
    JulianYears,
}

impl TimeUnit {
    /// Human-readable label used on plot axes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::JulianDays => "Julian days",
            Self::JulianYears => "Julian years",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Converts a Modified Julian Date to a Julian epoch year.
///
/// `J = 2000.0 + (JD - 2451545.0) / 365.25`, with `JD = MJD + 2400000.5`.
pub fn mjd_to_jyear(mjd: f64) -> f64 {
    2000.0 + (mjd + MJD_ZERO_JD - J2000_JD) / DAYS_PER_JULIAN_YEAR
}

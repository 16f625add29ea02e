//! Lightcurve retrieval: query generation, the record type and time units.

mod record;
mod sql;
mod time;

pub use record::{LightcurveRecord, LightcurveSummary};
pub use sql::{gen_sql, LightcurveQuery, DEFAULT_COLUMNS};
pub use time::{mjd_to_jyear, TimeUnit};

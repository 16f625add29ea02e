//! SQL generation for lightcurve queries.
//!
//! Lightcurves are stored one row per source, each column an array with one
//! element per detection epoch. The query unnests those arrays back into a
//! flat per-epoch table.

use crate::config::DEFAULT_TABLE;
use crate::error::{LcError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Columns fetched when the caller does not name any.
pub const DEFAULT_COLUMNS: [&str; 12] = [
    "detid",
    "catid",
    "mjdobs",
    "mag",
    "emag",
    "x",
    "y",
    "dp_objtype",
    "dp_chi",
    "ext",
    "pxl_cnf",
    "sky",
];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Builds the unnesting query for one source.
#[derive(Debug, Clone)]
pub struct LightcurveQuery<'a> {
    table: &'a str,
    columns: &'a [&'a str],
}

impl Default for LightcurveQuery<'_> {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE,
            columns: &DEFAULT_COLUMNS,
        }
    }
}

impl<'a> LightcurveQuery<'a> {
    /// Creates a query over the default table and columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads from `table` (optionally `schema.table`) instead of `virac_lc`.
    pub fn table(mut self, table: &'a str) -> Self {
        self.table = table;
        self
    }

    /// Selects `columns`, in this order, instead of the default set.
    pub fn columns(mut self, columns: &'a [&'a str]) -> Self {
        self.columns = columns;
        self
    }

    /// Renders the SQL for `source_id`.
    pub fn build(&self, source_id: i64) -> Result<String> {
        if self.columns.is_empty() {
            return Err(LcError::query("At least one column must be selected"));
        }

        validate_table(self.table)?;
        for column in self.columns {
            validate_identifier(column, "column")?;
        }

        let select = self
            .columns
            .iter()
            .map(|c| format!("unnest({c}) as {c}"))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "select {select} from {} where sourceid={source_id}",
            self.table
        ))
    }
}

/// Generates the lightcurve query for `source_id` over `virac_lc`.
///
/// `columns` defaults to [`DEFAULT_COLUMNS`].
pub fn gen_sql(source_id: i64, columns: Option<&[&str]>) -> Result<String> {
    let query = LightcurveQuery::new();
    match columns {
        Some(columns) => query.columns(columns).build(source_id),
        None => query.build(source_id),
    }
}

fn validate_identifier(name: &str, kind: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(LcError::query(format!("Invalid {kind} name: '{name}'")))
    }
}

fn validate_table(table: &str) -> Result<()> {
    match table.split_once('.') {
        Some((schema, name)) => {
            validate_identifier(schema, "schema")?;
            validate_identifier(name, "table")
        }
        None => validate_identifier(table, "table"),
    }
}

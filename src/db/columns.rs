//! Column-oriented view of a query result.
//!
//! The lightcurve query returns one row per detection epoch; the record wants
//! one numeric array per column. `ColumnSet` does that transposition and
//! settles each column on an integer or floating-point representation.

use super::{ColumnInfo, QueryResult, Value};
use crate::error::{LcError, Result};
use std::collections::HashMap;

/// The values of one result column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Integer column; `None` marks SQL NULL.
    Int(Vec<Option<i64>>),
    /// Floating-point column; SQL NULL is NaN.
    Float(Vec<f64>),
}

impl ColumnData {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    /// Returns true if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mapping from column name to equal-length numeric arrays.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: HashMap<String, ColumnData>,
    order: Vec<String>,
    row_count: usize,
}

impl ColumnSet {
    /// Transposes a row-oriented query result.
    ///
    /// Columns holding any float or numeric-text value become `Float`, the
    /// rest `Int`. Binary or non-numeric text values are a query error.
    pub fn from_result(result: &QueryResult) -> Result<Self> {
        let width = result.columns.len();
        if let Some(pos) = result.rows.iter().position(|row| row.len() != width) {
            return Err(LcError::query(format!(
                "Row {pos} has {} values but the result has {width} columns",
                result.rows[pos].len()
            )));
        }

        let mut set = Self {
            row_count: result.rows.len(),
            ..Self::default()
        };

        for (index, info) in result.columns.iter().enumerate() {
            let values = result.rows.iter().map(|row| &row[index]);
            let data = convert_column(info, values)?;

            if set.columns.insert(info.name.clone(), data).is_some() {
                return Err(LcError::query(format!(
                    "Column '{}' appears more than once in the result",
                    info.name
                )));
            }
            set.order.push(info.name.clone());
        }

        Ok(set)
    }

    /// Number of rows (detection epochs) in the set.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Returns true if the set has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Column names in result order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the raw data of a column.
    pub fn get(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    /// Returns a column as floats, with integers widened and NULL as NaN.
    ///
    /// A column absent from an empty result is an empty array; absent from a
    /// non-empty result it is a query error.
    pub fn floats(&self, name: &str) -> Result<Vec<f64>> {
        match self.columns.get(name) {
            Some(ColumnData::Float(values)) => Ok(values.clone()),
            Some(ColumnData::Int(values)) => Ok(values
                .iter()
                .map(|v| v.map_or(f64::NAN, |i| i as f64))
                .collect()),
            None => self.missing(name),
        }
    }

    /// Returns a column as integers.
    ///
    /// NULLs, and floats that are not whole numbers, are query errors.
    pub fn ints(&self, name: &str) -> Result<Vec<i64>> {
        match self.columns.get(name) {
            Some(ColumnData::Int(values)) => values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.ok_or_else(|| {
                        LcError::query(format!("NULL at row {i} in integer column '{name}'"))
                    })
                })
                .collect(),
            Some(ColumnData::Float(values)) => values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    if v.is_finite() && v.fract() == 0.0 {
                        Ok(v as i64)
                    } else {
                        Err(LcError::query(format!(
                            "Non-integer value {v} at row {i} in integer column '{name}'"
                        )))
                    }
                })
                .collect(),
            None => self.missing(name),
        }
    }

    fn missing<T>(&self, name: &str) -> Result<Vec<T>> {
        if self.is_empty() {
            Ok(Vec::new())
        } else {
            Err(LcError::query(format!(
                "Column '{name}' is missing from the query result"
            )))
        }
    }
}

fn convert_column<'a>(
    info: &ColumnInfo,
    values: impl Iterator<Item = &'a Value> + Clone,
) -> Result<ColumnData> {
    let name = &info.name;
    let is_float = values
        .clone()
        .any(|v| matches!(v, Value::Float(_) | Value::String(_)));

    if is_float {
        values
            .enumerate()
            .map(|(row, value)| match value {
                Value::Null => Ok(f64::NAN),
                Value::Float(f) => Ok(*f),
                Value::Int(i) => Ok(*i as f64),
                Value::Bool(b) => Ok(f64::from(u8::from(*b))),
                Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
                    LcError::query(format!(
                        "Non-numeric value '{s}' at row {row} in column {}",
                        column_label(info)
                    ))
                }),
                Value::Bytes(_) => Err(binary_value(info, row)),
            })
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::Float)
    } else {
        values
            .enumerate()
            .map(|(row, value)| match value {
                Value::Null => Ok(None),
                Value::Int(i) => Ok(Some(*i)),
                Value::Bool(b) => Ok(Some(i64::from(*b))),
                Value::Bytes(_) => Err(binary_value(info, row)),
                Value::Float(_) | Value::String(_) => Err(LcError::internal(format!(
                    "Column '{name}' was classified as integer but holds a float at row {row}"
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::Int)
    }
}

fn binary_value(info: &ColumnInfo, row: usize) -> LcError {
    LcError::query(format!(
        "Binary value at row {row} in column {}",
        column_label(info)
    ))
}

/// `'name' (TYPE)`, or just `'name'` when the type is unknown.
fn column_label(info: &ColumnInfo) -> String {
    if info.data_type.is_empty() {
        format!("'{}'", info.name)
    } else {
        format!("'{}' ({})", info.name, info.data_type)
    }
}

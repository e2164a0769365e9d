//! Column normalizers for kline tables.
//!
//! Three independent helpers that mutate a table in place and hand the same
//! reference back, so they can be chained in any order:
//! - `rename_columns`: lowercase headers, spaces to underscores
//! - `convert_to_datetime`: epoch milliseconds to `Datetime(ms)`
//! - `convert_to_numeric`: numeric-looking text to `Int64`/`Float64`
//!
//! Every named column is converted before any is written back, so a failed
//! call leaves the table as it was.

use super::schema::KlineSchema;
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("column not found: '{0}'")]
    ColumnNotFound(String),

    #[error("duplicate column after renaming: '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' row {row}: cannot interpret {value:?} as {expected}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("column '{column}' has unsupported type {dtype}")]
    UnsupportedType { column: String, dtype: String },

    #[error("table error: {0}")]
    Table(#[from] PolarsError),
}

const EPOCH_MS: &str = "an integer millisecond timestamp";
const NUMBER: &str = "a number";

/// Lowercase, then replace every space with `_`.
pub fn normalize_header(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Rename every column with `normalize_header`. Order-preserving, idempotent.
pub fn rename_columns(df: &mut DataFrame) -> Result<&mut DataFrame, NormalizeError> {
    let renames: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .map(|name| (name.to_string(), normalize_header(name)))
        .collect();

    let mut seen = HashSet::with_capacity(renames.len());
    for (_, new) in &renames {
        if !seen.insert(new.as_str()) {
            return Err(NormalizeError::DuplicateColumn(new.clone()));
        }
    }

    for (old, new) in renames {
        if old != new {
            df.rename(&old, new.into())?;
        }
    }

    Ok(df)
}

/// Replace each named column with a `Datetime(Milliseconds)` column.
///
/// Accepts integer columns, integral floats, and text holding either form
/// (`"1700000000000"` or `"1700000000000.0"`). Nulls (and NaN floats) stay
/// null. Columns that are already datetimes are left as they are.
pub fn convert_to_datetime<'a>(
    df: &'a mut DataFrame,
    columns: &[&str],
) -> Result<&'a mut DataFrame, NormalizeError> {
    require_columns(df, columns)?;

    let mut converted = Vec::with_capacity(columns.len());
    for &name in columns {
        converted.push(to_datetime(name, df.column(name)?)?);
    }
    for column in converted {
        df.with_column(column)?;
    }

    debug!(?columns, "converted to datetime");
    Ok(df)
}

/// Replace each named column with a numeric column.
///
/// Text becomes `Int64` when every value is an integer, `Float64` otherwise.
/// Text columns with no values (empty or all null) become `Float64`.
/// Numeric columns pass through. Surrounding whitespace is ignored and empty
/// text becomes null.
pub fn convert_to_numeric<'a>(
    df: &'a mut DataFrame,
    columns: &[&str],
) -> Result<&'a mut DataFrame, NormalizeError> {
    require_columns(df, columns)?;

    let mut converted = Vec::with_capacity(columns.len());
    for &name in columns {
        converted.push(to_numeric(name, df.column(name)?)?);
    }
    for column in converted {
        df.with_column(column)?;
    }

    debug!(?columns, "converted to numeric");
    Ok(df)
}

/// Rename, then type the two time columns and the nine value columns.
/// `ignore` is left as fetched.
pub fn normalize_klines(df: &mut DataFrame) -> Result<&mut DataFrame, NormalizeError> {
    rename_columns(df)?;
    convert_to_datetime(df, &KlineSchema::DATETIME_COLUMNS)?;
    convert_to_numeric(df, &KlineSchema::NUMERIC_COLUMNS)
}

fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), NormalizeError> {
    match columns.iter().find(|c| df.get_column_index(c).is_none()) {
        Some(missing) => Err(NormalizeError::ColumnNotFound(missing.to_string())),
        None => Ok(()),
    }
}

fn invalid(
    column: &str,
    row: usize,
    value: impl ToString,
    expected: &'static str,
) -> NormalizeError {
    NormalizeError::InvalidValue {
        column: column.to_string(),
        row,
        value: value.to_string(),
        expected,
    }
}

fn unsupported(column: &str, dtype: &DataType) -> NormalizeError {
    NormalizeError::UnsupportedType {
        column: column.to_string(),
        dtype: dtype.to_string(),
    }
}

fn to_datetime(name: &str, column: &Column) -> Result<Column, NormalizeError> {
    let dtype = column.dtype();
    if matches!(dtype, DataType::Datetime(_, _)) {
        return Ok(column.clone());
    }

    let millis: Vec<Option<i64>> = if dtype.is_integer() {
        let ints = column.cast(&DataType::Int64)?;
        ints.i64()?.into_iter().collect()
    } else if dtype.is_float() {
        let floats = column.cast(&DataType::Float64)?;
        floats
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                None => Ok(None),
                Some(f) if f.is_nan() => Ok(None),
                Some(f) => integral_ms(f)
                    .map(Some)
                    .ok_or_else(|| invalid(name, row, f, EPOCH_MS)),
            })
            .collect::<Result<_, _>>()?
    } else if matches!(dtype, DataType::String) {
        column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v.map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => s
                    .parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral_ms))
                    .map(Some)
                    .ok_or_else(|| invalid(name, row, s, EPOCH_MS)),
            })
            .collect::<Result<_, _>>()?
    } else {
        return Err(unsupported(name, dtype));
    };

    // Must be a representable calendar instant.
    for (row, ms) in millis.iter().enumerate() {
        if let Some(ms) = *ms {
            if chrono::DateTime::from_timestamp_millis(ms).is_none() {
                return Err(invalid(name, row, ms, EPOCH_MS));
            }
        }
    }

    let column = Column::new(name.into(), millis);
    Ok(column.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}

/// Whole-number float as epoch milliseconds.
fn integral_ms(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn to_numeric(name: &str, column: &Column) -> Result<Column, NormalizeError> {
    let dtype = column.dtype();
    if dtype.is_integer() || dtype.is_float() {
        return Ok(column.clone());
    }
    if !matches!(dtype, DataType::String) {
        return Err(unsupported(name, dtype));
    }

    let cells: Vec<Option<&str>> = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()))
        .collect();

    let ints: Option<Vec<Option<i64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s.parse::<i64>().ok().map(Some),
        })
        .collect();
    // Nothing to infer from: use the wider type.
    let has_values = cells.iter().any(Option::is_some);
    if let Some(ints) = ints.filter(|_| has_values) {
        return Ok(Column::new(name.into(), ints));
    }

    let floats = cells
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            None => Ok(None),
            Some(s) => s
                .parse::<f64>()
                .map(Some)
                .map_err(|_| invalid(name, row, s, NUMBER)),
        })
        .collect::<Result<Vec<Option<f64>>, _>>()?;

    Ok(Column::new(name.into(), floats))
}

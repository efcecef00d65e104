//! Shared helpers for column checks, distinct counts and null filling.
//!
//! Transformers and chart builders call these instead of repeating the same
//! lookups against the frame.

use crate::columns::{SemanticType, is_numeric_dtype};
use crate::error::{Result, TabularError};
use polars::prelude::*;

// =============================================================================
// Column Checks
// =============================================================================

/// Fetch a column as a Series, mapping a miss to `ColumnNotFound`.
pub fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| TabularError::ColumnNotFound(name.to_string()))
}

/// Verify every named column exists.
pub fn check_columns(df: &DataFrame, columns: &[String]) -> Result<()> {
    for name in columns {
        series(df, name)?;
    }
    Ok(())
}

/// Verify every named column exists and is numeric.
pub fn check_numeric(df: &DataFrame, columns: &[String]) -> Result<()> {
    for name in columns {
        if !is_numeric_dtype(series(df, name)?.dtype()) {
            return Err(TabularError::NotNumeric(name.clone()));
        }
    }
    Ok(())
}

/// Verify every named column exists and holds categories (categorical,
/// boolean or object).
pub fn check_categorical(df: &DataFrame, columns: &[String]) -> Result<()> {
    for name in columns {
        let ty = SemanticType::of(series(df, name)?.dtype());
        if !ty.is_categorical_like() {
            return Err(TabularError::TypeMismatch {
                column: name.clone(),
                expected: "categorical".to_string(),
                found: ty.tag().to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Distinct Values
// =============================================================================

/// Distinct count of every column, in frame order. Null counts as a value.
pub fn unique_count(df: &DataFrame) -> Result<Vec<(String, usize)>> {
    df.get_columns()
        .iter()
        .map(|column| {
            let count = column.as_materialized_series().n_unique()?;
            Ok((column.name().to_string(), count))
        })
        .collect()
}

/// Distinct count of one column. Null counts as a value.
pub fn distinct_count(df: &DataFrame, name: &str) -> Result<usize> {
    Ok(series(df, name)?.n_unique()?)
}

/// Distinct values of a column in first-appearance order.
pub fn distinct_values(df: &DataFrame, name: &str) -> Result<Series> {
    Ok(series(df, name)?.unique_stable()?)
}

// =============================================================================
// Statistics
// =============================================================================

/// Mean of a numeric column, ignoring nulls. `None` when every value is null.
pub fn column_mean(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    let s = series(df, name)?;
    if !is_numeric_dtype(s.dtype()) {
        return Err(TabularError::NotNumeric(name.to_string()));
    }
    Ok(s.mean())
}

/// Percentage (0-100) of missing values per column, in frame order.
pub fn percentage_missing(df: &DataFrame) -> Vec<(String, f64)> {
    let height = df.height();
    df.get_columns()
        .iter()
        .map(|column| {
            let pct = if height == 0 {
                0.0
            } else {
                column.null_count() as f64 / height as f64 * 100.0
            };
            (column.name().to_string(), pct)
        })
        .collect()
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Values of a numeric series as `f64`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Values of any series rendered as strings.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

// =============================================================================
// Null Filling
// =============================================================================

/// Fill nulls in a numeric Series with a value, at most `limit` of them.
///
/// Integer columns keep their dtype when the fill value is integral.
pub fn fill_numeric_nulls(
    series: &Series,
    fill_value: f64,
    limit: Option<usize>,
) -> PolarsResult<Series> {
    let values = numeric_values(series)?;
    let mut remaining = limit.unwrap_or(usize::MAX);
    let filled: Vec<Option<f64>> = values
        .into_iter()
        .map(|value| match value {
            None if remaining > 0 => {
                remaining -= 1;
                Some(fill_value)
            }
            other => other,
        })
        .collect();

    let out = Series::new(series.name().clone(), filled);
    if series.dtype().is_integer() && fill_value.fract() == 0.0 {
        out.cast(series.dtype())
    } else {
        Ok(out)
    }
}

/// Fill nulls in a text Series with a value, at most `limit` of them.
pub fn fill_string_nulls(
    series: &Series,
    fill_value: &str,
    limit: Option<usize>,
) -> PolarsResult<Series> {
    let mut remaining = limit.unwrap_or(usize::MAX);
    let filled: Vec<Option<String>> = string_values(series)?
        .into_iter()
        .map(|value| match value {
            None if remaining > 0 => {
                remaining -= 1;
                Some(fill_value.to_string())
            }
            other => other,
        })
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill nulls in a boolean Series with a value, at most `limit` of them.
pub fn fill_bool_nulls(
    series: &Series,
    fill_value: bool,
    limit: Option<usize>,
) -> PolarsResult<Series> {
    let mut remaining = limit.unwrap_or(usize::MAX);
    let filled: Vec<Option<bool>> = series
        .bool()?
        .into_iter()
        .map(|value| match value {
            None if remaining > 0 => {
                remaining -= 1;
                Some(fill_value)
            }
            other => other,
        })
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================

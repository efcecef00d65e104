//! Row-wise arithmetic over numeric columns.

use super::{Transformer, column_list, column_name};
use crate::error::{ConfigValidationError, Result};
use crate::table::Table;
use crate::utils::{check_numeric, numeric_values, series};
use polars::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Collect the listed columns as f64 vectors.
fn numeric_matrix(df: &DataFrame, columns: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
    check_numeric(df, columns)?;
    columns
        .iter()
        .map(|name| -> Result<Vec<Option<f64>>> { Ok(numeric_values(series(df, name)?)?) })
        .collect()
}

/// Fold rows of the matrix, skipping nulls.
fn fold_rows(
    matrix: &[Vec<Option<f64>>],
    height: usize,
    init: f64,
    op: fn(f64, f64) -> f64,
) -> Vec<f64> {
    (0..height)
        .map(|row| {
            matrix
                .iter()
                .filter_map(|column| column[row])
                .fold(init, op)
        })
        .collect()
}

fn with_new_column(table: &Table, series: Series) -> Result<Table> {
    let mut frame = table.frame().clone();
    frame.with_column(series)?;
    Ok(table.replace_frame(frame))
}

/// Adds columns together into a new column.
///
/// Missing values are skipped, so a row whose values are all missing sums to 0.
#[derive(Debug, Clone)]
pub struct ColumnAdder {
    columns: Vec<String>,
    new_column: String,
}

impl ColumnAdder {
    pub fn new<I, S>(
        columns: I,
        new_column: impl Into<String>,
    ) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            columns: column_list(columns, "columns")?,
            new_column: column_name(new_column, "new_column")?,
        })
    }
}

impl Transformer for ColumnAdder {
    fn name(&self) -> &'static str {
        "ColumnAdder"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let matrix = numeric_matrix(table.frame(), &self.columns)?;
        let sums = fold_rows(&matrix, table.height(), 0.0, |acc, v| acc + v);
        with_new_column(table, Series::new(self.new_column.as_str().into(), sums))
    }
}

/// Multiplies columns together into a new column.
///
/// Missing values are skipped, so a row whose values are all missing yields 1.
#[derive(Debug, Clone)]
pub struct ColumnMultiplier {
    columns: Vec<String>,
    new_column: String,
}

impl ColumnMultiplier {
    pub fn new<I, S>(
        columns: I,
        new_column: impl Into<String>,
    ) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            columns: column_list(columns, "columns")?,
            new_column: column_name(new_column, "new_column")?,
        })
    }
}

impl Transformer for ColumnMultiplier {
    fn name(&self) -> &'static str {
        "ColumnMultiplier"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let matrix = numeric_matrix(table.frame(), &self.columns)?;
        let products = fold_rows(&matrix, table.height(), 1.0, |acc, v| acc * v);
        with_new_column(table, Series::new(self.new_column.as_str().into(), products))
    }
}

/// Subtracts `right` from `left` into a new column. Missing values propagate.
#[derive(Debug, Clone)]
pub struct ColumnSubtraction {
    left: String,
    right: String,
    new_column: String,
}

impl ColumnSubtraction {
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        new_column: impl Into<String>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        Ok(Self {
            left: column_name(left, "left")?,
            right: column_name(right, "right")?,
            new_column: column_name(new_column, "new_column")?,
        })
    }
}

impl Transformer for ColumnSubtraction {
    fn name(&self) -> &'static str {
        "ColumnSubtraction"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let matrix = numeric_matrix(table.frame(), &[self.left.clone(), self.right.clone()])?;
        let differences: Vec<Option<f64>> = matrix[0]
            .iter()
            .zip(&matrix[1])
            .map(|(l, r)| Some((*l)? - (*r)?))
            .collect();
        with_new_column(
            table,
            Series::new(self.new_column.as_str().into(), differences),
        )
    }
}

/// Signature of a column-producing function.
pub type ColumnFn = dyn Fn(&DataFrame) -> PolarsResult<Series> + Send + Sync;

/// Computes a column with an arbitrary function.
///
/// The produced series is renamed to `new_column`; an existing column of that
/// name is replaced.
#[derive(Clone)]
pub struct FunctionTransformer {
    new_column: String,
    func: Arc<ColumnFn>,
}

impl FunctionTransformer {
    pub fn new<F>(
        new_column: impl Into<String>,
        func: F,
    ) -> std::result::Result<Self, ConfigValidationError>
    where
        F: Fn(&DataFrame) -> PolarsResult<Series> + Send + Sync + 'static,
    {
        Ok(Self {
            new_column: column_name(new_column, "new_column")?,
            func: Arc::new(func),
        })
    }
}

impl fmt::Debug for FunctionTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTransformer")
            .field("new_column", &self.new_column)
            .finish_non_exhaustive()
    }
}

impl Transformer for FunctionTransformer {
    fn name(&self) -> &'static str {
        "FunctionTransformer"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let mut produced = (self.func)(table.frame())?;
        produced.rename(self.new_column.as_str().into());
        with_new_column(table, produced)
    }
}

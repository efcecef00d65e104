//! Expanding, rolling and resampling aggregations.
//!
//! Time-keyed operations need a table whose row index is a datetime. The index
//! is moved into a temporary column for the lazy query and split back out of
//! the result.

use super::{Transformer, aggregate_expr, column_list};
use crate::columns::is_numeric_dtype;
use crate::config::{AggregationMethod, Frequency};
use crate::error::{ConfigValidationError, Result, TabularError};
use crate::table::Table;
use crate::utils::check_numeric;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const INDEX_COLUMN: &str = "__mallet_index__";

fn rolling_expr(
    expr: Expr,
    method: AggregationMethod,
    options: RollingOptionsFixedWindow,
) -> Expr {
    match method {
        AggregationMethod::Mean => expr.rolling_mean(options),
        AggregationMethod::Sum => expr.rolling_sum(options),
        AggregationMethod::Min => expr.rolling_min(options),
        AggregationMethod::Max => expr.rolling_max(options),
        AggregationMethod::Std => expr.rolling_std(options),
        AggregationMethod::Var => expr.rolling_var(options),
    }
}

fn rolling_by_expr(
    expr: Expr,
    by: Expr,
    method: AggregationMethod,
    options: RollingOptionsDynamicWindow,
) -> Expr {
    match method {
        AggregationMethod::Mean => expr.rolling_mean_by(by, options),
        AggregationMethod::Sum => expr.rolling_sum_by(by, options),
        AggregationMethod::Min => expr.rolling_min_by(by, options),
        AggregationMethod::Max => expr.rolling_max_by(by, options),
        AggregationMethod::Std => expr.rolling_std_by(by, options),
        AggregationMethod::Var => expr.rolling_var_by(by, options),
    }
}

fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

/// The row index as a column, or `MissingTimeIndex`.
fn time_index_column(table: &Table) -> Result<(Series, DataFrame)> {
    if !table.is_time_indexed() {
        return Err(TabularError::MissingTimeIndex);
    }
    let index = table.index().ok_or(TabularError::MissingTimeIndex)?.clone();
    let mut frame = table.frame().clone();
    frame.with_column(index.clone().with_name(INDEX_COLUMN.into()))?;
    Ok((index, frame))
}

fn fixed_window(window_size: usize, min_periods: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size,
        min_periods,
        ..Default::default()
    }
}

// =============================================================================
// ExpandingTransformer
// =============================================================================

/// Replaces columns with their expanding-window aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandingTransformer {
    columns: Vec<String>,
    min_periods: usize,
    aggregation: AggregationMethod,
}

impl ExpandingTransformer {
    pub fn new<I, S>(
        columns: I,
        min_periods: usize,
        aggregation: AggregationMethod,
    ) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            columns: column_list(columns, "columns")?,
            min_periods,
            aggregation,
        })
    }
}

impl Transformer for ExpandingTransformer {
    fn name(&self) -> &'static str {
        "ExpandingTransformer"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        check_numeric(table.frame(), &self.columns)?;
        if table.height() == 0 {
            return Ok(table.clone());
        }

        // An expanding window is a fixed window as long as the table.
        let options = fixed_window(table.height(), self.min_periods.max(1));
        let exprs: Vec<Expr> = self
            .columns
            .iter()
            .map(|name| {
                rolling_expr(
                    col(name.as_str()).cast(DataType::Float64),
                    self.aggregation,
                    options.clone(),
                )
                .alias(name.as_str())
            })
            .collect();

        let frame = table.frame().clone().lazy().with_columns(exprs).collect()?;
        Ok(table.replace_frame(frame))
    }
}

// =============================================================================
// RollingWindow
// =============================================================================

/// Size of a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// A fixed number of rows.
    Rows(usize),
    /// A time span over the row index, right closed.
    Time(Frequency),
}

impl Window {
    /// Parse `"4H"` style rules as time windows and bare integers as row counts.
    pub fn parse(rule: &str) -> std::result::Result<Self, ConfigValidationError> {
        match rule.trim().parse::<usize>() {
            Ok(rows) => Ok(Window::Rows(rows)),
            Err(_) => Ok(Window::Time(rule.parse()?)),
        }
    }
}

/// Replaces numeric columns with a rolling aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingWindow {
    window: Window,
    min_periods: usize,
    aggregation: AggregationMethod,
    columns: Option<Vec<String>>,
}

impl RollingWindow {
    /// Build a rolling window.
    ///
    /// `min_periods` defaults to the window length for row windows and to 1
    /// for time windows.
    pub fn new(
        window: Window,
        min_periods: Option<usize>,
        aggregation: AggregationMethod,
        columns: Option<Vec<String>>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        let min_periods = match window {
            Window::Rows(0) => {
                return Err(ConfigValidationError::OutOfRange {
                    field: "window",
                    value: "0".to_string(),
                    reason: "must be positive",
                });
            }
            Window::Rows(rows) => {
                let min_periods = min_periods.unwrap_or(rows);
                if min_periods > rows {
                    return Err(ConfigValidationError::OutOfRange {
                        field: "min_periods",
                        value: min_periods.to_string(),
                        reason: "must not exceed the window",
                    });
                }
                min_periods
            }
            Window::Time(_) => min_periods.unwrap_or(1),
        };
        let columns = columns.map(|c| column_list(c, "columns")).transpose()?;

        Ok(Self {
            window,
            min_periods,
            aggregation,
            columns,
        })
    }

    fn targets(&self, df: &DataFrame) -> Result<Vec<String>> {
        match &self.columns {
            Some(columns) => {
                check_numeric(df, columns)?;
                Ok(columns.clone())
            }
            None => Ok(numeric_columns(df)),
        }
    }
}

impl Transformer for RollingWindow {
    fn name(&self) -> &'static str {
        "RollingWindow"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let targets = self.targets(table.frame())?;

        match self.window {
            Window::Rows(rows) => {
                let options = fixed_window(rows, self.min_periods);
                let exprs: Vec<Expr> = targets
                    .iter()
                    .map(|name| {
                        rolling_expr(
                            col(name.as_str()).cast(DataType::Float64),
                            self.aggregation,
                            options.clone(),
                        )
                        .alias(name.as_str())
                    })
                    .collect();
                let frame = table.frame().clone().lazy().with_columns(exprs).collect()?;
                Ok(table.replace_frame(frame))
            }
            Window::Time(span) => {
                let (_, frame) = time_index_column(table)?;
                let options = RollingOptionsDynamicWindow {
                    window_size: span.to_duration(),
                    min_periods: self.min_periods,
                    closed_window: ClosedWindow::Right,
                    fn_params: None,
                };
                let exprs: Vec<Expr> = targets
                    .iter()
                    .map(|name| {
                        rolling_by_expr(
                            col(name.as_str()).cast(DataType::Float64),
                            col(INDEX_COLUMN),
                            self.aggregation,
                            options.clone(),
                        )
                        .alias(name.as_str())
                    })
                    .collect();
                let frame = frame
                    .lazy()
                    .with_columns(exprs)
                    .collect()?
                    .drop(INDEX_COLUMN)?;
                Ok(table.replace_frame(frame))
            }
        }
    }
}

// =============================================================================
// Resampler
// =============================================================================

/// Window length in the physical unit of `dtype`, when it divides evenly.
fn bucket_step(dtype: &DataType, rule: &Frequency) -> Option<i64> {
    let per_unit = match dtype {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 1,
        DataType::Datetime(TimeUnit::Microseconds, _) => 1_000,
        DataType::Datetime(TimeUnit::Milliseconds, _) => 1_000_000,
        DataType::Date => 86_400_000_000_000,
        _ => return None,
    };
    let ns = rule.nanoseconds()?;
    (ns % per_unit == 0).then(|| ns / per_unit)
}

/// Days from 0001-01-01 to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn physical_to_naive(dtype: &DataType, key: i64) -> Option<NaiveDateTime> {
    match dtype {
        DataType::Date => {
            let days = i32::try_from(key).ok()?.checked_add(EPOCH_DAYS_FROM_CE)?;
            NaiveDate::from_num_days_from_ce_opt(days).map(|d| d.and_time(NaiveTime::MIN))
        }
        DataType::Datetime(TimeUnit::Milliseconds, None) => {
            DateTime::from_timestamp_millis(key).map(|t| t.naive_utc())
        }
        DataType::Datetime(TimeUnit::Microseconds, None) => {
            DateTime::from_timestamp_micros(key).map(|t| t.naive_utc())
        }
        DataType::Datetime(TimeUnit::Nanoseconds, None) => {
            Some(DateTime::from_timestamp_nanos(key).naive_utc())
        }
        _ => None,
    }
}

fn naive_to_physical(dtype: &DataType, at: NaiveDateTime) -> Option<i64> {
    let utc = at.and_utc();
    match dtype {
        DataType::Date => Some(i64::from(at.date().num_days_from_ce() - EPOCH_DAYS_FROM_CE)),
        DataType::Datetime(TimeUnit::Milliseconds, _) => Some(utc.timestamp_millis()),
        DataType::Datetime(TimeUnit::Microseconds, _) => Some(utc.timestamp_micros()),
        DataType::Datetime(TimeUnit::Nanoseconds, _) => utc.timestamp_nanos_opt(),
        _ => None,
    }
}

/// Start of every window from `first` to `last`, as physical keys.
///
/// `None` when the windows cannot be stepped exactly: fixed spans that do not
/// divide the index unit, or calendar spans over a zone-aware index.
fn window_starts(dtype: &DataType, rule: &Frequency, first: i64, last: i64) -> Option<Vec<i64>> {
    let Some(months) = rule.months() else {
        let step = bucket_step(dtype, rule).filter(|&step| step > 0)?;
        return Some((first..=last).step_by(usize::try_from(step).ok()?).collect());
    };

    let end = physical_to_naive(dtype, last)?;
    let mut at = physical_to_naive(dtype, first)?;
    let mut starts = Vec::new();
    while at <= end {
        starts.push(naive_to_physical(dtype, at)?);
        at = at.checked_add_months(Months::new(months))?;
    }
    Some(starts)
}

/// Add a null row for every empty window between the first and last one.
///
/// `group_by_dynamic` only emits windows holding at least one row, so gaps
/// and finer target frequencies would otherwise lose buckets.
fn fill_buckets(resampled: DataFrame, dtype: &DataType, rule: &Frequency) -> Result<DataFrame> {
    let keys = resampled
        .column(INDEX_COLUMN)?
        .as_materialized_series()
        .to_physical_repr()
        .cast(&DataType::Int64)?;
    let keys = keys.i64()?;
    let (Some(first), Some(last)) = (keys.min(), keys.max()) else {
        return Ok(resampled);
    };
    let Some(starts) = window_starts(dtype, rule, first, last) else {
        return Ok(resampled);
    };

    let physical = Series::new(INDEX_COLUMN.into(), starts);
    let full = match dtype {
        DataType::Date => physical.cast(&DataType::Int32)?.cast(dtype)?,
        _ => physical.cast(dtype)?,
    };

    Ok(DataFrame::new(vec![full.into_column()])?
        .lazy()
        .join(
            resampled.lazy(),
            [col(INDEX_COLUMN)],
            [col(INDEX_COLUMN)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([INDEX_COLUMN], SortMultipleOptions::default())
        .collect()?)
}

/// Re-buckets a time-indexed table into fixed windows.
///
/// Numeric columns are aggregated per window; the resulting index holds each
/// window's start. Every window between the first and last row is present, so
/// empty windows (gaps, or a target finer than the data) hold nulls. Other
/// columns are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resampler {
    rule: Frequency,
    aggregation: AggregationMethod,
}

impl Resampler {
    /// Build from an offset alias such as `"2H"` or `"1D"`.
    pub fn new(
        rule: &str,
        aggregation: AggregationMethod,
    ) -> std::result::Result<Self, ConfigValidationError> {
        Ok(Self::with_frequency(rule.parse()?, aggregation))
    }

    pub fn with_frequency(rule: Frequency, aggregation: AggregationMethod) -> Self {
        Self { rule, aggregation }
    }
}

impl Transformer for Resampler {
    fn name(&self) -> &'static str {
        "Resampler"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let (index, frame) = time_index_column(table)?;
        let targets = numeric_columns(table.frame());

        let options = DynamicGroupOptions {
            every: self.rule.to_duration(),
            period: self.rule.to_duration(),
            offset: Duration::parse("0ns"),
            ..Default::default()
        };
        let aggs: Vec<Expr> = targets
            .iter()
            .map(|name| {
                aggregate_expr(col(name.as_str()).cast(DataType::Float64), self.aggregation)
                    .alias(name.as_str())
            })
            .collect();

        let resampled = frame
            .lazy()
            .sort([INDEX_COLUMN], SortMultipleOptions::default())
            .group_by_dynamic(col(INDEX_COLUMN), Vec::<Expr>::new(), options)
            .agg(aggs)
            .collect()?;
        let resampled = fill_buckets(resampled, index.dtype(), &self.rule)?;

        let out = Table::set_index(resampled, INDEX_COLUMN)?;
        let (frame, new_index) = out.into_parts();
        match new_index {
            Some(new_index) => Table::with_index(frame, new_index.with_name(index.name().clone())),
            None => Ok(Table::new(frame)),
        }
    }
}

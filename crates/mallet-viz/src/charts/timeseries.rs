//! Line charts of numeric columns over time.

use super::{Chart, build_chart, float_column, titled_layout};
use crate::eligibility::ChartKind;
use crate::error::Result;
use mallet_tabular::utils::{series, string_values};
use mallet_tabular::{ColumnTypeMap, Table};
use plotly::common::Mode;
use plotly::{Scatter, Trace};
use polars::prelude::*;
use tracing::debug;

/// A time-like column ready to serve as an x axis.
struct TimeAxis {
    name: String,
    /// Physical values, used for ordering.
    keys: Vec<Option<i64>>,
    labels: Vec<Option<String>>,
}

impl TimeAxis {
    fn from_series(series: &Series) -> Result<Self> {
        let physical = series.cast(&DataType::Int64)?;
        let keys: Vec<Option<i64>> = physical.i64()?.into_iter().collect();
        let labels = match series.dtype() {
            DataType::Duration(_) => keys.iter().map(|k| k.map(|v| v.to_string())).collect(),
            _ => string_values(series)?,
        };
        Ok(Self {
            name: series.name().to_string(),
            keys,
            labels,
        })
    }
}

/// One line chart per time axis and numeric column, sorted by time.
///
/// Time axes are the datetime and duration columns, then the table's row
/// index when it holds timestamps.
pub fn create_timeseries(table: &Table, types: &ColumnTypeMap) -> Result<Vec<Chart>> {
    let df = table.frame();

    let mut axes = Vec::new();
    for name in types.datetime_merged().iter().chain(types.duration()) {
        axes.push(TimeAxis::from_series(series(df, name)?)?);
    }
    if let Some(index) = table.index().filter(|_| table.is_time_indexed()) {
        axes.push(TimeAxis::from_series(index)?);
    }

    if axes.is_empty() || types.numeric().is_empty() {
        debug!("Time series skipped: no time axis or no numeric column");
        return Ok(Vec::new());
    }

    let mut charts = Vec::new();
    for axis in &axes {
        let mut order: Vec<usize> = (0..axis.keys.len())
            .filter(|&row| axis.keys[row].is_some())
            .collect();
        order.sort_by_key(|&row| axis.keys[row]);

        for value in types.numeric() {
            let values = float_column(df, value)?;
            let (x, y): (Vec<String>, Vec<f64>) = order
                .iter()
                .filter_map(|&row| match (&axis.labels[row], values[row]) {
                    (Some(label), Some(v)) if v.is_finite() => Some((label.clone(), v)),
                    _ => None,
                })
                .unzip();

            let title = format!("{} over {}", value, axis.name);
            let traces: Vec<Box<dyn Trace>> =
                vec![Scatter::new(x, y).mode(Mode::Lines).name(value.as_str())];
            let layout = titled_layout(&title, false, false);
            charts.push(build_chart(ChartKind::Timeseries, title, traces, layout));
        }
    }
    Ok(charts)
}

//! Charts relating pairs of numeric columns.

use super::traces::{DensityTrace, MarginalTrace};
use super::{
    Chart, build_chart, complete_points, float_column, label_column, marginal_layout,
    titled_layout,
};
use crate::config::{AutoPlotConfig, DensityStyle, Marginal};
use crate::eligibility::ChartKind;
use crate::error::Result;
use crate::selection::{column_use, numeric_pairs};
use mallet_tabular::{ColumnTypeMap, CorrelationMethod, Table, correlation_matrix};
use plotly::common::Mode;
use plotly::{HeatMap, Scatter, Trace};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterOptions {
    pub log_x: bool,
    pub log_y: bool,
    /// Threshold handed to [`column_use`] when splitting category columns.
    pub maximum_color_groups: usize,
    /// Distributions of x drawn above and of y drawn to the right.
    pub marginal: Option<Marginal>,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            log_x: false,
            log_y: false,
            maximum_color_groups: 5,
            marginal: None,
        }
    }
}

impl From<&AutoPlotConfig> for ScatterOptions {
    fn from(config: &AutoPlotConfig) -> Self {
        Self {
            log_x: config.log_x,
            log_y: config.log_y,
            maximum_color_groups: config.maximum_color_groups,
            marginal: config.marginals,
        }
    }
}

/// Scatter plots for every pair of numeric columns.
///
/// Without category columns each pair gets one plain chart. Otherwise the
/// category columns are split with [`column_use`] and each pair gets one chart
/// per (hover name, color) combination; a side with no columns contributes a
/// single "none" entry.
pub fn create_scatter(
    table: &Table,
    types: &ColumnTypeMap,
    options: &ScatterOptions,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let pairs = numeric_pairs(df, types.numeric());
    if pairs.is_empty() {
        debug!("Scatter plots skipped: fewer than two numeric columns");
        return Ok(Vec::new());
    }

    let mut charts = Vec::new();
    if types.categorical_set().is_empty() {
        for (x, y) in &pairs {
            let title = format!("Plot of {} vs {}", x, y);
            charts.push(scatter_chart(df, title, x, y, None, None, options)?);
        }
        return Ok(charts);
    }

    let split = column_use(df, types, options.maximum_color_groups)?;
    let names = optional(&split.name);
    let hues = optional(&split.hue);

    for (x, y) in &pairs {
        for name in &names {
            for hue in &hues {
                let title = format!(
                    "Plot of {} vs {} with color {} and hover name {}",
                    x,
                    y,
                    hue.unwrap_or("none"),
                    name.unwrap_or("none")
                );
                charts.push(scatter_chart(df, title, x, y, *name, *hue, options)?);
            }
        }
    }
    Ok(charts)
}

fn scatter_chart(
    df: &DataFrame,
    title: String,
    x: &str,
    y: &str,
    hover_name: Option<&str>,
    hue: Option<&str>,
    options: &ScatterOptions,
) -> Result<Chart> {
    let mut traces = scatter_traces(df, x, y, hover_name, hue)?;
    if let Some(kind) = options.marginal {
        let (xs, ys) = complete_points(&float_column(df, x)?, &float_column(df, y)?);
        traces.push(MarginalTrace::top(kind, x, xs));
        traces.push(MarginalTrace::right(kind, y, ys));
    }
    let framed = options.marginal.is_some();
    let layout = marginal_layout(&title, options.log_x, options.log_y, framed, framed);
    Ok(build_chart(ChartKind::Scatter, title, traces, layout))
}

fn optional(columns: &[String]) -> Vec<Option<&str>> {
    if columns.is_empty() {
        vec![None]
    } else {
        columns.iter().map(|c| Some(c.as_str())).collect()
    }
}

/// Marker traces for one pair, one per hue value when a hue column is given.
fn scatter_traces(
    df: &DataFrame,
    x: &str,
    y: &str,
    hover_name: Option<&str>,
    hue: Option<&str>,
) -> Result<Vec<Box<dyn Trace>>> {
    let xs = float_column(df, x)?;
    let ys = float_column(df, y)?;
    let names = hover_name.map(|c| label_column(df, c)).transpose()?;
    let hues = hue.map(|c| label_column(df, c)).transpose()?;

    let mut groups: Vec<ScatterGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in 0..df.height() {
        let (Some(xv), Some(yv)) = (xs[row], ys[row]) else {
            continue;
        };
        let key = match &hues {
            Some(hues) => hues[row].clone().unwrap_or_else(|| "null".to_string()),
            None => String::new(),
        };
        let index = *positions.entry(key.clone()).or_insert_with(|| {
            groups.push(ScatterGroup::new(key));
            groups.len() - 1
        });

        let group = &mut groups[index];
        group.x.push(xv);
        group.y.push(yv);
        if let Some(names) = &names {
            group.text.push(names[row].clone().unwrap_or_default());
        }
    }

    Ok(groups
        .into_iter()
        .map(|group| {
            let label = if hue.is_some() { group.key.as_str() } else { y };
            let trace = Scatter::new(group.x, group.y).mode(Mode::Markers).name(label);
            let trace = if names.is_some() {
                trace.text_array(group.text)
            } else {
                trace
            };
            trace as Box<dyn Trace>
        })
        .collect())
}

struct ScatterGroup {
    key: String,
    x: Vec<f64>,
    y: Vec<f64>,
    text: Vec<String>,
}

impl ScatterGroup {
    fn new(key: String) -> Self {
        Self {
            key,
            x: Vec::new(),
            y: Vec::new(),
            text: Vec::new(),
        }
    }
}

/// Heatmap of the correlation matrix over every numeric column.
///
/// Needs at least two numeric columns.
pub fn create_correlation_plot(
    table: &Table,
    types: &ColumnTypeMap,
    method: CorrelationMethod,
) -> Result<Vec<Chart>> {
    let numeric = types.numeric();
    if numeric.len() < 2 {
        debug!("Correlation plot skipped: fewer than two numeric columns");
        return Ok(Vec::new());
    }

    let matrix = correlation_matrix(table.frame(), numeric, method)?;
    let title = format!("Correlation plot using {} method", method);
    let traces: Vec<Box<dyn Trace>> = vec![HeatMap::new(
        matrix.names.clone(),
        matrix.names.clone(),
        matrix.values,
    )];
    let layout = titled_layout(&title, false, false);
    Ok(vec![build_chart(ChartKind::CorrelationMatrix, title, traces, layout)])
}

/// Two-dimensional density of every pair of numeric columns.
pub fn create_density_chart(
    table: &Table,
    types: &ColumnTypeMap,
    style: DensityStyle,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let kind = match style {
        DensityStyle::Contour => ChartKind::DensityContour,
        DensityStyle::Heatmap => ChartKind::DensityHeatmap,
    };

    let mut charts = Vec::new();
    for (x, y) in numeric_pairs(df, types.numeric()) {
        let (xs, ys) = complete_points(&float_column(df, &x)?, &float_column(df, &y)?);
        let label = format!("{} vs {}", x, y);
        let trace = match style {
            DensityStyle::Contour => DensityTrace::contour(&label, xs, ys),
            DensityStyle::Heatmap => DensityTrace::heatmap(&label, xs, ys),
        };
        let title = format!("Density {} of {}", style, label);
        let traces: Vec<Box<dyn Trace>> = vec![trace];
        let layout = titled_layout(&title, false, false);
        charts.push(build_chart(kind, title, traces, layout));
    }
    Ok(charts)
}

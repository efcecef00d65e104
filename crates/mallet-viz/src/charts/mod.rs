//! Chart builders.
//!
//! One function per chart kind. Each takes the table, the column types
//! computed once by the caller, and the builder's options, and returns the
//! charts it could draw. A table that does not meet a builder's needs (no
//! category column, fewer than two numeric columns, ...) yields an empty list;
//! errors are reserved for failures inside Polars.

pub mod distribution;
pub mod hierarchy;
pub mod pie;
pub mod relation;
pub mod timeseries;
pub mod traces;

pub use distribution::{
    BoxOptions, HistogramOptions, ViolinOptions, create_box, create_histogram, create_violin,
};
pub use hierarchy::{create_sunburst, create_treemap};
pub use pie::create_pie;
pub use relation::{ScatterOptions, create_correlation_plot, create_density_chart, create_scatter};
pub use timeseries::create_timeseries;

use crate::eligibility::ChartKind;
use crate::error::Result;
use mallet_tabular::utils::{numeric_values, series, string_values};
use plotly::common::Title;
use plotly::layout::{Axis, AxisType, Layout};
use plotly::{Plot, Trace};
use polars::prelude::*;
use std::fmt;

/// A rendered chart together with what it shows.
pub struct Chart {
    kind: ChartKind,
    title: String,
    plot: Plot,
}

impl Chart {
    pub(crate) fn new(kind: ChartKind, title: String, plot: Plot) -> Self {
        Self { kind, title, plot }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn plot(&self) -> &Plot {
        &self.plot
    }

    /// Figure JSON (`data` and `layout`) as plotly.js reads it.
    pub fn to_json(&self) -> String {
        self.plot.to_json()
    }

    /// Markup for the chart alone; plotly.js must already be loaded.
    pub fn to_inline_html(&self, div_id: &str) -> String {
        self.plot.to_inline_html(Some(div_id))
    }
}

impl fmt::Debug for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("kind", &self.kind)
            .field("title", &self.title)
            .finish()
    }
}

const MAIN_DOMAIN: [f64; 2] = [0.0, 0.8];
const MARGINAL_DOMAIN: [f64; 2] = [0.82, 1.0];

/// Layout carrying a title and optional log axes.
pub(crate) fn titled_layout(title: &str, log_x: bool, log_y: bool) -> Layout {
    marginal_layout(title, log_x, log_y, false, false)
}

/// Like [`titled_layout`], leaving a strip above (`y2`) and/or to the right
/// (`x2`) of the main axes for marginal traces.
pub(crate) fn marginal_layout(
    title: &str,
    log_x: bool,
    log_y: bool,
    top: bool,
    right: bool,
) -> Layout {
    let log_axis = |log: bool| log.then(|| Axis::new().type_(AxisType::Log));
    let mut x_axis = log_axis(log_x);
    let mut y_axis = log_axis(log_y);
    let mut layout = Layout::new().title(Title::with_text(title));

    if top {
        y_axis = Some(y_axis.unwrap_or_default().domain(&MAIN_DOMAIN));
        layout = layout.y_axis2(
            Axis::new()
                .domain(&MARGINAL_DOMAIN)
                .anchor("x")
                .show_tick_labels(false),
        );
    }
    if right {
        x_axis = Some(x_axis.unwrap_or_default().domain(&MAIN_DOMAIN));
        layout = layout.x_axis2(
            Axis::new()
                .domain(&MARGINAL_DOMAIN)
                .anchor("y")
                .show_tick_labels(false),
        );
    }

    if let Some(axis) = x_axis {
        layout = layout.x_axis(axis);
    }
    if let Some(axis) = y_axis {
        layout = layout.y_axis(axis);
    }
    layout
}

pub(crate) fn build_chart(
    kind: ChartKind,
    title: String,
    traces: Vec<Box<dyn Trace>>,
    layout: Layout,
) -> Chart {
    let mut plot = Plot::new();
    for trace in traces {
        plot.add_trace(trace);
    }
    plot.set_layout(layout);
    Chart::new(kind, title, plot)
}

/// Values of a column as floats, nulls kept.
pub(crate) fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(numeric_values(series(df, name)?)?)
}

/// Values of a column rendered as labels, nulls kept.
pub(crate) fn label_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(string_values(series(df, name)?)?)
}

/// Rows where both the label and the value are present.
pub(crate) fn labelled_values(
    labels: Vec<Option<String>>,
    values: Vec<Option<f64>>,
) -> (Vec<String>, Vec<f64>) {
    labels
        .into_iter()
        .zip(values)
        .filter_map(|(label, value)| match (label, value) {
            (Some(label), Some(value)) if value.is_finite() => Some((label, value)),
            _ => None,
        })
        .unzip()
}

/// Rows where both values are present.
pub(crate) fn complete_points(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip()
}

/// Render a column list the way titles show it, e.g. `[C, D]`.
pub(crate) fn bracketed(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

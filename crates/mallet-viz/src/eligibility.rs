//! Rule table deciding which chart kinds a table supports.

use mallet_tabular::ColumnTypeMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of chart the builders know how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Pie,
    Scatter,
    Histogram,
    Boxplot,
    Violin,
    Treemap,
    Sunburst,
    CorrelationMatrix,
    DensityContour,
    DensityHeatmap,
    Timeseries,
}

impl ChartKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Histogram => "histogram",
            ChartKind::Boxplot => "boxplot",
            ChartKind::Violin => "violin",
            ChartKind::Treemap => "treemap",
            ChartKind::Sunburst => "sunburst",
            ChartKind::CorrelationMatrix => "correlation-matrix",
            ChartKind::DensityContour => "density-contour",
            ChartKind::DensityHeatmap => "density-heatmap",
            ChartKind::Timeseries => "timeseries",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Chart kinds applicable to a table, in a fixed order.
///
/// `low_cardinality_count` is the number of category columns small enough to
/// become pie sectors. Every rule needs at least one numeric column, so a
/// table without one supports nothing.
pub fn applicable_charts(types: &ColumnTypeMap, low_cardinality_count: usize) -> Vec<ChartKind> {
    let numeric = types.numeric().len();
    if numeric == 0 {
        return Vec::new();
    }

    let mut kinds = Vec::new();
    if numeric >= 2 {
        kinds.extend([
            ChartKind::Scatter,
            ChartKind::CorrelationMatrix,
            ChartKind::DensityContour,
            ChartKind::DensityHeatmap,
        ]);
    }
    kinds.extend([ChartKind::Histogram, ChartKind::Boxplot, ChartKind::Violin]);

    if !types.categorical_set().is_empty() {
        kinds.extend([ChartKind::Treemap, ChartKind::Sunburst]);
    }
    if !types.datetime_merged().is_empty() || !types.duration().is_empty() {
        kinds.push(ChartKind::Timeseries);
    }
    if low_cardinality_count > 0 {
        kinds.push(ChartKind::Pie);
    }
    kinds
}

//! Box plots, violin plots and histograms.

use super::traces::{MarginalTrace, ViolinTrace};
use super::{
    Chart, build_chart, float_column, label_column, labelled_values, marginal_layout,
    titled_layout,
};
use crate::config::{AutoPlotConfig, DisplayMode, HistFunc, HistNorm, Marginal, PointDisplay};
use crate::eligibility::ChartKind;
use crate::error::Result;
use crate::selection::columns_with_distinct_values;
use mallet_tabular::{ColumnTypeMap, Table};
use plotly::box_plot::BoxPoints;
use plotly::histogram::{self, Cumulative};
use plotly::layout::{BoxMode, ViolinMode};
use plotly::{BoxPlot, Histogram, Trace};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxOptions {
    pub points: PointDisplay,
    pub mode: DisplayMode,
    pub notched: bool,
    /// Category columns with more distinct values than this are not used.
    pub maximum_categories: usize,
}

impl From<&AutoPlotConfig> for BoxOptions {
    fn from(config: &AutoPlotConfig) -> Self {
        Self {
            points: config.box_points,
            mode: config.boxmode,
            notched: config.box_notched,
            maximum_categories: config.maximum_number_boxplots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolinOptions {
    pub points: PointDisplay,
    pub mode: DisplayMode,
    pub display_box: bool,
    /// Category columns with more distinct values than this are not used.
    pub maximum_categories: usize,
}

impl From<&AutoPlotConfig> for ViolinOptions {
    fn from(config: &AutoPlotConfig) -> Self {
        Self {
            points: config.violin_points,
            mode: config.violinmode,
            display_box: config.violin_box,
            maximum_categories: config.maximum_number_violinplots,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistogramOptions {
    pub nbins: Option<usize>,
    pub cumulative: bool,
    pub histfunc: Option<HistFunc>,
    pub histnorm: Option<HistNorm>,
    pub log_x: bool,
    pub log_y: bool,
    /// Distribution drawn above each histogram.
    pub marginal: Option<Marginal>,
}

impl From<&AutoPlotConfig> for HistogramOptions {
    fn from(config: &AutoPlotConfig) -> Self {
        Self {
            nbins: config.nbins,
            cumulative: config.cumulative,
            histfunc: config.histfunc,
            histnorm: config.histnorm,
            log_x: config.log_x,
            log_y: config.log_y,
            marginal: config.marginals,
        }
    }
}

fn box_points(points: PointDisplay) -> BoxPoints {
    match points {
        PointDisplay::All => BoxPoints::All,
        PointDisplay::Outliers => BoxPoints::Outliers,
        PointDisplay::SuspectedOutliers => BoxPoints::SuspectedOutliers,
        PointDisplay::None => BoxPoints::False,
    }
}

fn hist_func(func: HistFunc) -> histogram::HistFunc {
    match func {
        HistFunc::Count => histogram::HistFunc::Count,
        HistFunc::Sum => histogram::HistFunc::Sum,
        HistFunc::Avg => histogram::HistFunc::Average,
        HistFunc::Min => histogram::HistFunc::Minimum,
        HistFunc::Max => histogram::HistFunc::Maximum,
    }
}

fn hist_norm(norm: HistNorm) -> histogram::HistNorm {
    match norm {
        HistNorm::Percent => histogram::HistNorm::Percent,
        HistNorm::Probability => histogram::HistNorm::Probability,
        HistNorm::Density => histogram::HistNorm::Density,
        HistNorm::ProbabilityDensity => histogram::HistNorm::ProbabilityDensity,
    }
}

fn histogram_trace(
    name: &str,
    values: Vec<f64>,
    options: &HistogramOptions,
) -> Box<Histogram<f64>> {
    let mut trace = Histogram::new(values).name(name);
    if let Some(nbins) = options.nbins {
        trace = trace.n_bins_x(nbins);
    }
    if options.cumulative {
        trace = trace.cumulative(Cumulative::new().enabled(true));
    }
    if let Some(func) = options.histfunc {
        trace = trace.hist_func(hist_func(func));
    }
    if let Some(norm) = options.histnorm {
        trace = trace.hist_norm(hist_norm(norm));
    }
    trace
}

/// One box plot per numeric column and low-cardinality category column.
pub fn create_box(
    table: &Table,
    types: &ColumnTypeMap,
    options: &BoxOptions,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let categories = columns_with_distinct_values(df, types, options.maximum_categories, true)?;
    if categories.is_empty() {
        debug!("Box plots skipped: no category column with few enough values");
        return Ok(Vec::new());
    }

    let mut charts = Vec::new();
    for value in types.numeric() {
        for category in &categories {
            let (x, y) = labelled_values(label_column(df, category)?, float_column(df, value)?);
            let title = format!(
                "Boxplot showing distribution of {} across {} categories",
                value, category
            );
            let trace = BoxPlot::new_xy(x, y)
                .name(value)
                .box_points(box_points(options.points))
                .notched(options.notched);
            let traces: Vec<Box<dyn Trace>> = vec![trace];
            let layout = titled_layout(&title, false, false).box_mode(match options.mode {
                DisplayMode::Group => BoxMode::Group,
                DisplayMode::Overlay => BoxMode::Overlay,
            });
            charts.push(build_chart(ChartKind::Boxplot, title, traces, layout));
        }
    }
    Ok(charts)
}

/// One violin plot per numeric column and low-cardinality category column.
pub fn create_violin(
    table: &Table,
    types: &ColumnTypeMap,
    options: &ViolinOptions,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let categories = columns_with_distinct_values(df, types, options.maximum_categories, true)?;
    if categories.is_empty() {
        debug!("Violin plots skipped: no category column with few enough values");
        return Ok(Vec::new());
    }

    let mut charts = Vec::new();
    for value in types.numeric() {
        for category in &categories {
            let (x, y) = labelled_values(label_column(df, category)?, float_column(df, value)?);
            let title = format!(
                "Violinplot showing distribution of {} across {} categories",
                value, category
            );
            let traces: Vec<Box<dyn Trace>> =
                vec![ViolinTrace::new(value, x, y, options.points, options.display_box)];
            let layout = titled_layout(&title, false, false).violin_mode(match options.mode {
                DisplayMode::Group => ViolinMode::Group,
                DisplayMode::Overlay => ViolinMode::Overlay,
            });
            charts.push(build_chart(ChartKind::Violin, title, traces, layout));
        }
    }
    Ok(charts)
}

/// One histogram per listed column. Columns that are missing or not numeric
/// are skipped.
pub fn create_histogram(
    table: &Table,
    types: &ColumnTypeMap,
    numeric_cols: &[String],
    options: &HistogramOptions,
) -> Result<Vec<Chart>> {
    let df = table.frame();
    let mut charts = Vec::new();

    for name in numeric_cols {
        if !types.numeric().contains(name) {
            debug!("Histogram skipped for {}: not a numeric column", name);
            continue;
        }
        let values: Vec<f64> = float_column(df, name)?
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect();

        let title = format!("Distribution of {}", name);
        let marginal = options
            .marginal
            .map(|kind| MarginalTrace::top(kind, name, values.clone()));
        let mut traces: Vec<Box<dyn Trace>> = vec![histogram_trace(name, values, options)];
        if let Some(marginal) = marginal {
            traces.push(marginal);
        }
        let layout = marginal_layout(
            &title,
            options.log_x,
            options.log_y,
            options.marginal.is_some(),
            false,
        );
        charts.push(build_chart(ChartKind::Histogram, title, traces, layout));
    }
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn games() -> Table {
        Table::new(
            df![
                "A" => [1i64, 2, 3, 4, 5],
                "B" => [2i64, 4, 6, 8, 10],
                "C" => [2i64, 3, 4, 5, 6],
                "D" => [4i64, 7, 2, 5, 7],
                "E" => [true, true, false, true, true],
                "F" => ["chess", "scrabble", "checkers", "card games", "dominoes"],
            ]
            .unwrap(),
        )
    }

    fn numbers_only() -> Table {
        Table::new(
            df![
                "A" => [1i64, 2, 3, 4, 5],
                "B" => [2i64, 4, 6, 8, 10],
            ]
            .unwrap(),
        )
    }

    fn box_options(maximum: usize) -> BoxOptions {
        BoxOptions {
            points: PointDisplay::Outliers,
            mode: DisplayMode::Group,
            notched: false,
            maximum_categories: maximum,
        }
    }

    // ==== Box plot tests ====

    #[test]
    fn test_box_per_numeric_and_category() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());

        let charts = create_box(&table, &types, &box_options(7)).unwrap();
        // 4 numeric columns x {E, F}
        assert_eq!(charts.len(), 8);
        assert_eq!(
            charts[0].title(),
            "Boxplot showing distribution of A across E categories"
        );
        assert_eq!(charts[0].kind(), ChartKind::Boxplot);

        let charts = create_box(&table, &types, &box_options(3)).unwrap();
        assert_eq!(charts.len(), 4);
    }

    #[test]
    fn test_box_options_reach_trace() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());
        let options = BoxOptions {
            points: PointDisplay::None,
            notched: true,
            ..box_options(3)
        };

        let charts = create_box(&table, &types, &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&charts[0].to_json()).unwrap();
        let trace = &json["data"][0];
        assert_eq!(trace["type"], "box");
        assert_eq!(trace["notched"], true);
        assert_eq!(trace["boxpoints"], false);
        assert_eq!(json["layout"]["boxmode"], "group");
    }

    #[test]
    fn test_box_without_categories_is_empty() {
        let table = numbers_only();
        let types = ColumnTypeMap::classify(table.frame());
        assert!(create_box(&table, &types, &box_options(7)).unwrap().is_empty());
    }

    // ==== Violin tests ====

    #[test]
    fn test_violin_modes_reach_layout() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());
        let options = ViolinOptions {
            points: PointDisplay::All,
            mode: DisplayMode::Overlay,
            display_box: true,
            maximum_categories: 7,
        };

        let charts = create_violin(&table, &types, &options).unwrap();
        assert_eq!(charts.len(), 8);
        let json = charts[0].to_json();
        assert!(json.contains("\"violin\""));
        assert!(json.contains("\"overlay\""));
    }

    #[test]
    fn test_violin_without_categories_is_empty() {
        let table = numbers_only();
        let types = ColumnTypeMap::classify(table.frame());
        let options = ViolinOptions::from(&AutoPlotConfig::default());
        assert!(create_violin(&table, &types, &options).unwrap().is_empty());
    }

    // ==== Histogram tests ====

    #[test]
    fn test_histogram_per_numeric_column() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());
        let options = HistogramOptions {
            nbins: Some(20),
            ..Default::default()
        };
        let cols: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();

        let charts = create_histogram(&table, &types, &cols, &options).unwrap();
        assert_eq!(charts.len(), 4);
        assert_eq!(charts[3].title(), "Distribution of D");
        assert!(charts[0].to_json().contains("nbinsx"));
    }

    #[test]
    fn test_histogram_options_reach_trace() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());
        let options = HistogramOptions {
            cumulative: true,
            histfunc: Some(HistFunc::Avg),
            histnorm: Some(HistNorm::ProbabilityDensity),
            ..Default::default()
        };

        let charts = create_histogram(&table, &types, &["A".to_string()], &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&charts[0].to_json()).unwrap();
        let trace = &json["data"][0];
        assert_eq!(trace["type"], "histogram");
        assert_eq!(trace["cumulative"]["enabled"], true);
        assert_eq!(trace["histfunc"], "avg");
        assert_eq!(trace["histnorm"], "probability density");
        assert!(trace.get("nbinsx").is_none());
    }

    #[test]
    fn test_histogram_marginal_sits_above() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());
        let options = HistogramOptions {
            marginal: Some(Marginal::Violin),
            ..Default::default()
        };

        let charts = create_histogram(&table, &types, &["B".to_string()], &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&charts[0].to_json()).unwrap();
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"], "histogram");
        assert_eq!(data[1]["type"], "violin");
        assert_eq!(data[1]["yaxis"], "y2");
        assert_eq!(data[1]["x"].as_array().unwrap().len(), 5);
        assert_eq!(json["layout"]["yaxis2"]["domain"][0], 0.82);
    }

    #[test]
    fn test_histogram_skips_text_columns() {
        let table = games();
        let types = ColumnTypeMap::classify(table.frame());
        let charts = create_histogram(
            &table,
            &types,
            &["F".to_string()],
            &HistogramOptions::default(),
        )
        .unwrap();
        assert!(charts.is_empty());
    }
}

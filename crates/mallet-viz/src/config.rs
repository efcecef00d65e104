//! Configuration for automatic chart generation.
//!
//! [`AutoPlotConfig`] carries every option [`AutoPlot`](crate::AutoPlot)
//! forwards to the chart builders. Use [`AutoPlotConfig::builder()`] for a
//! validated configuration, or deserialize one from JSON (missing fields take
//! their defaults).

use mallet_tabular::{ConfigValidationError, CorrelationMethod};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How several boxes or violins sharing a position are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Side by side
    #[default]
    Group,
    /// On top of each other
    Overlay,
}

impl FromStr for DisplayMode {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(DisplayMode::Group),
            "overlay" => Ok(DisplayMode::Overlay),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "display mode",
                value: s.to_string(),
                expected: "group, overlay",
            }),
        }
    }
}

/// Which sample points are drawn next to a box or violin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointDisplay {
    All,
    #[default]
    Outliers,
    SuspectedOutliers,
    None,
}

impl PointDisplay {
    /// The value plotly.js expects for its `points`/`boxpoints` attribute.
    pub fn plotly_value(&self) -> serde_json::Value {
        match self {
            PointDisplay::All => "all".into(),
            PointDisplay::Outliers => "outliers".into(),
            PointDisplay::SuspectedOutliers => "suspectedoutliers".into(),
            PointDisplay::None => false.into(),
        }
    }
}

impl FromStr for PointDisplay {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PointDisplay::All),
            "outliers" => Ok(PointDisplay::Outliers),
            "suspectedoutliers" | "suspected-outliers" => Ok(PointDisplay::SuspectedOutliers),
            "none" | "false" => Ok(PointDisplay::None),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "point display",
                value: s.to_string(),
                expected: "all, outliers, suspectedoutliers, none",
            }),
        }
    }
}

/// Aggregation applied to the values falling in each histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl FromStr for HistFunc {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(HistFunc::Count),
            "sum" => Ok(HistFunc::Sum),
            "avg" | "mean" => Ok(HistFunc::Avg),
            "min" => Ok(HistFunc::Min),
            "max" => Ok(HistFunc::Max),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "histogram function",
                value: s.to_string(),
                expected: "count, sum, avg, min, max",
            }),
        }
    }
}

/// Normalization of histogram bar heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistNorm {
    #[serde(rename = "percent")]
    Percent,
    #[serde(rename = "probability")]
    Probability,
    #[serde(rename = "density")]
    Density,
    #[serde(rename = "probability density")]
    ProbabilityDensity,
}

impl FromStr for HistNorm {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" => Ok(HistNorm::Percent),
            "probability" => Ok(HistNorm::Probability),
            "density" => Ok(HistNorm::Density),
            "probability density" | "probability-density" => Ok(HistNorm::ProbabilityDensity),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "histogram normalization",
                value: s.to_string(),
                expected: "percent, probability, density, probability density",
            }),
        }
    }
}

/// Distribution drawn on a side axis of a scatter plot or histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marginal {
    Histogram,
    Box,
    Violin,
}

impl Marginal {
    /// The plotly.js trace type drawn on the side axis.
    pub fn trace_type(&self) -> &'static str {
        match self {
            Marginal::Histogram => "histogram",
            Marginal::Box => "box",
            Marginal::Violin => "violin",
        }
    }
}

impl FromStr for Marginal {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "histogram" => Ok(Marginal::Histogram),
            "box" => Ok(Marginal::Box),
            "violin" => Ok(Marginal::Violin),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "marginal",
                value: s.to_string(),
                expected: "histogram, box, violin",
            }),
        }
    }
}

/// Rendering of a two-dimensional density chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityStyle {
    Contour,
    Heatmap,
}

impl fmt::Display for DensityStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityStyle::Contour => f.write_str("contour"),
            DensityStyle::Heatmap => f.write_str("heatmap"),
        }
    }
}

/// What happens to an existing report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Replace the file
    #[default]
    Overwrite,
    /// Add the new document after the existing content
    Append,
}

/// Options for [`AutoPlot`](crate::AutoPlot).
///
/// # Example
///
/// ```rust,ignore
/// use mallet_viz::AutoPlotConfig;
///
/// let config = AutoPlotConfig::builder()
///     .include_scatter(true)
///     .maximum_number_boxplots(3)
///     .filename("report")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlotConfig {
    pub include_scatter: bool,
    pub include_box: bool,
    pub include_treemap: bool,
    pub include_sunburst: bool,
    pub include_correlation: bool,
    pub include_pie: bool,
    pub include_histogram: bool,
    pub include_violin: bool,
    pub include_density: bool,
    pub include_timeseries: bool,

    /// Number of histogram bins. `None` lets plotly.js choose.
    pub nbins: Option<usize>,
    pub cumulative: bool,
    pub histfunc: Option<HistFunc>,
    pub histnorm: Option<HistNorm>,
    pub log_x: bool,
    pub log_y: bool,
    /// Side distributions for scatter plots and histograms.
    pub marginals: Option<Marginal>,

    pub box_points: PointDisplay,
    pub boxmode: DisplayMode,
    pub box_notched: bool,

    pub violinmode: DisplayMode,
    /// Draw a box inside each violin.
    pub violin_box: bool,
    pub violin_points: PointDisplay,

    /// Maximum depth of the treemap path.
    pub treemap_path_limit: usize,
    /// Maximum depth of the sunburst path.
    pub sunburst_path_limit: usize,
    pub correlation_method: CorrelationMethod,

    /// Category columns with at most this many distinct values get pie charts.
    pub maximum_number_sectors: usize,
    /// Category columns with at most this many distinct values get box plots.
    pub maximum_number_boxplots: usize,
    /// Category columns with at most this many distinct values get violins.
    pub maximum_number_violinplots: usize,
    /// Scatter coloring threshold: a category column colors points when it
    /// averages at least this many rows per distinct value.
    pub maximum_color_groups: usize,
    pub pie_chart_hole: bool,

    /// Write the report when [`AutoPlot::show`](crate::AutoPlot::show) runs.
    pub create_html: bool,
    /// Report file name without the `.html` extension.
    pub filename: String,
    pub write_mode: WriteMode,
}

impl Default for AutoPlotConfig {
    fn default() -> Self {
        Self {
            include_scatter: false,
            include_box: true,
            include_treemap: true,
            include_sunburst: true,
            include_correlation: false,
            include_pie: true,
            include_histogram: true,
            include_violin: true,
            include_density: false,
            include_timeseries: true,
            nbins: None,
            cumulative: false,
            histfunc: None,
            histnorm: None,
            log_x: false,
            log_y: false,
            marginals: None,
            box_points: PointDisplay::Outliers,
            boxmode: DisplayMode::Group,
            box_notched: false,
            violinmode: DisplayMode::Group,
            violin_box: true,
            violin_points: PointDisplay::All,
            treemap_path_limit: 2,
            sunburst_path_limit: 2,
            correlation_method: CorrelationMethod::Pearson,
            maximum_number_sectors: 3,
            maximum_number_boxplots: 5,
            maximum_number_violinplots: 5,
            maximum_color_groups: 5,
            pie_chart_hole: false,
            create_html: true,
            filename: "autoplot".to_string(),
            write_mode: WriteMode::Overwrite,
        }
    }
}

impl AutoPlotConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AutoPlotConfigBuilder {
        AutoPlotConfigBuilder::default()
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ConfigValidationError::Empty { field: "filename" });
        }

        let positive = [
            ("treemap_path_limit", self.treemap_path_limit),
            ("sunburst_path_limit", self.sunburst_path_limit),
            ("maximum_number_sectors", self.maximum_number_sectors),
            ("maximum_number_boxplots", self.maximum_number_boxplots),
            ("maximum_number_violinplots", self.maximum_number_violinplots),
            ("maximum_color_groups", self.maximum_color_groups),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigValidationError::OutOfRange {
                    field,
                    value: value.to_string(),
                    reason: "must be at least 1",
                });
            }
        }

        if self.nbins == Some(0) {
            return Err(ConfigValidationError::OutOfRange {
                field: "nbins",
                value: "0".to_string(),
                reason: "must be at least 1",
            });
        }

        Ok(())
    }
}

/// Builder for [`AutoPlotConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AutoPlotConfigBuilder {
    include_scatter: Option<bool>,
    include_box: Option<bool>,
    include_treemap: Option<bool>,
    include_sunburst: Option<bool>,
    include_correlation: Option<bool>,
    include_pie: Option<bool>,
    include_histogram: Option<bool>,
    include_violin: Option<bool>,
    include_density: Option<bool>,
    include_timeseries: Option<bool>,
    nbins: Option<usize>,
    cumulative: Option<bool>,
    histfunc: Option<HistFunc>,
    histnorm: Option<HistNorm>,
    log_x: Option<bool>,
    log_y: Option<bool>,
    marginals: Option<Marginal>,
    box_points: Option<PointDisplay>,
    boxmode: Option<DisplayMode>,
    box_notched: Option<bool>,
    violinmode: Option<DisplayMode>,
    violin_box: Option<bool>,
    violin_points: Option<PointDisplay>,
    treemap_path_limit: Option<usize>,
    sunburst_path_limit: Option<usize>,
    correlation_method: Option<CorrelationMethod>,
    maximum_number_sectors: Option<usize>,
    maximum_number_boxplots: Option<usize>,
    maximum_number_violinplots: Option<usize>,
    maximum_color_groups: Option<usize>,
    pie_chart_hole: Option<bool>,
    create_html: Option<bool>,
    filename: Option<String>,
    write_mode: Option<WriteMode>,
}

impl AutoPlotConfigBuilder {
    pub fn include_scatter(mut self, include: bool) -> Self {
        self.include_scatter = Some(include);
        self
    }

    pub fn include_box(mut self, include: bool) -> Self {
        self.include_box = Some(include);
        self
    }

    pub fn include_treemap(mut self, include: bool) -> Self {
        self.include_treemap = Some(include);
        self
    }

    pub fn include_sunburst(mut self, include: bool) -> Self {
        self.include_sunburst = Some(include);
        self
    }

    pub fn include_correlation(mut self, include: bool) -> Self {
        self.include_correlation = Some(include);
        self
    }

    pub fn include_pie(mut self, include: bool) -> Self {
        self.include_pie = Some(include);
        self
    }

    pub fn include_histogram(mut self, include: bool) -> Self {
        self.include_histogram = Some(include);
        self
    }

    pub fn include_violin(mut self, include: bool) -> Self {
        self.include_violin = Some(include);
        self
    }

    /// Enable density contour and density heatmap charts.
    pub fn include_density(mut self, include: bool) -> Self {
        self.include_density = Some(include);
        self
    }

    pub fn include_timeseries(mut self, include: bool) -> Self {
        self.include_timeseries = Some(include);
        self
    }

    /// Set the number of histogram bins.
    pub fn nbins(mut self, nbins: usize) -> Self {
        self.nbins = Some(nbins);
        self
    }

    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = Some(cumulative);
        self
    }

    pub fn histfunc(mut self, histfunc: HistFunc) -> Self {
        self.histfunc = Some(histfunc);
        self
    }

    pub fn histnorm(mut self, histnorm: HistNorm) -> Self {
        self.histnorm = Some(histnorm);
        self
    }

    pub fn log_x(mut self, log: bool) -> Self {
        self.log_x = Some(log);
        self
    }

    pub fn log_y(mut self, log: bool) -> Self {
        self.log_y = Some(log);
        self
    }

    /// Draw side distributions on scatter plots and histograms.
    pub fn marginals(mut self, marginal: Marginal) -> Self {
        self.marginals = Some(marginal);
        self
    }

    pub fn box_points(mut self, points: PointDisplay) -> Self {
        self.box_points = Some(points);
        self
    }

    pub fn boxmode(mut self, mode: DisplayMode) -> Self {
        self.boxmode = Some(mode);
        self
    }

    pub fn box_notched(mut self, notched: bool) -> Self {
        self.box_notched = Some(notched);
        self
    }

    pub fn violinmode(mut self, mode: DisplayMode) -> Self {
        self.violinmode = Some(mode);
        self
    }

    pub fn violin_box(mut self, display_box: bool) -> Self {
        self.violin_box = Some(display_box);
        self
    }

    pub fn violin_points(mut self, points: PointDisplay) -> Self {
        self.violin_points = Some(points);
        self
    }

    pub fn treemap_path_limit(mut self, limit: usize) -> Self {
        self.treemap_path_limit = Some(limit);
        self
    }

    pub fn sunburst_path_limit(mut self, limit: usize) -> Self {
        self.sunburst_path_limit = Some(limit);
        self
    }

    pub fn correlation_method(mut self, method: CorrelationMethod) -> Self {
        self.correlation_method = Some(method);
        self
    }

    pub fn maximum_number_sectors(mut self, maximum: usize) -> Self {
        self.maximum_number_sectors = Some(maximum);
        self
    }

    pub fn maximum_number_boxplots(mut self, maximum: usize) -> Self {
        self.maximum_number_boxplots = Some(maximum);
        self
    }

    pub fn maximum_number_violinplots(mut self, maximum: usize) -> Self {
        self.maximum_number_violinplots = Some(maximum);
        self
    }

    pub fn maximum_color_groups(mut self, maximum: usize) -> Self {
        self.maximum_color_groups = Some(maximum);
        self
    }

    pub fn pie_chart_hole(mut self, hole: bool) -> Self {
        self.pie_chart_hole = Some(hole);
        self
    }

    pub fn create_html(mut self, create: bool) -> Self {
        self.create_html = Some(create);
        self
    }

    /// Set the report file name (without extension).
    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = Some(mode);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AutoPlotConfig` or an error if validation fails.
    pub fn build(self) -> Result<AutoPlotConfig, ConfigValidationError> {
        let defaults = AutoPlotConfig::default();
        let config = AutoPlotConfig {
            include_scatter: self.include_scatter.unwrap_or(defaults.include_scatter),
            include_box: self.include_box.unwrap_or(defaults.include_box),
            include_treemap: self.include_treemap.unwrap_or(defaults.include_treemap),
            include_sunburst: self.include_sunburst.unwrap_or(defaults.include_sunburst),
            include_correlation: self
                .include_correlation
                .unwrap_or(defaults.include_correlation),
            include_pie: self.include_pie.unwrap_or(defaults.include_pie),
            include_histogram: self.include_histogram.unwrap_or(defaults.include_histogram),
            include_violin: self.include_violin.unwrap_or(defaults.include_violin),
            include_density: self.include_density.unwrap_or(defaults.include_density),
            include_timeseries: self.include_timeseries.unwrap_or(defaults.include_timeseries),
            nbins: self.nbins,
            cumulative: self.cumulative.unwrap_or(defaults.cumulative),
            histfunc: self.histfunc,
            histnorm: self.histnorm,
            log_x: self.log_x.unwrap_or(defaults.log_x),
            log_y: self.log_y.unwrap_or(defaults.log_y),
            marginals: self.marginals,
            box_points: self.box_points.unwrap_or(defaults.box_points),
            boxmode: self.boxmode.unwrap_or(defaults.boxmode),
            box_notched: self.box_notched.unwrap_or(defaults.box_notched),
            violinmode: self.violinmode.unwrap_or(defaults.violinmode),
            violin_box: self.violin_box.unwrap_or(defaults.violin_box),
            violin_points: self.violin_points.unwrap_or(defaults.violin_points),
            treemap_path_limit: self.treemap_path_limit.unwrap_or(defaults.treemap_path_limit),
            sunburst_path_limit: self
                .sunburst_path_limit
                .unwrap_or(defaults.sunburst_path_limit),
            correlation_method: self.correlation_method.unwrap_or(defaults.correlation_method),
            maximum_number_sectors: self
                .maximum_number_sectors
                .unwrap_or(defaults.maximum_number_sectors),
            maximum_number_boxplots: self
                .maximum_number_boxplots
                .unwrap_or(defaults.maximum_number_boxplots),
            maximum_number_violinplots: self
                .maximum_number_violinplots
                .unwrap_or(defaults.maximum_number_violinplots),
            maximum_color_groups: self
                .maximum_color_groups
                .unwrap_or(defaults.maximum_color_groups),
            pie_chart_hole: self.pie_chart_hole.unwrap_or(defaults.pie_chart_hole),
            create_html: self.create_html.unwrap_or(defaults.create_html),
            filename: self.filename.unwrap_or(defaults.filename),
            write_mode: self.write_mode.unwrap_or(defaults.write_mode),
        };

        config.validate()?;
        Ok(config)
    }
}

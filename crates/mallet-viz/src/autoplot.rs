//! Entry point for automatic chart generation.

use crate::charts::{
    self, BoxOptions, HistogramOptions, ScatterOptions, ViolinOptions, create_box,
    create_correlation_plot, create_density_chart, create_histogram, create_pie, create_scatter,
    create_sunburst, create_timeseries, create_treemap, create_violin,
};
use crate::config::{AutoPlotConfig, DensityStyle};
use crate::eligibility::{ChartKind, applicable_charts};
use crate::error::Result;
use crate::report::Report;
use crate::selection::columns_with_distinct_values;
use mallet_tabular::{ColumnTypeMap, Table};
use tracing::{debug, info};

/// Inspects a table once and draws every applicable, enabled chart.
///
/// # Example
///
/// ```rust,ignore
/// use mallet_viz::{AutoPlot, AutoPlotConfig};
///
/// let config = AutoPlotConfig::builder().include_scatter(true).build()?;
/// let report = AutoPlot::new(table, config)?.show()?;
/// println!("{} charts", report.len());
/// ```
pub struct AutoPlot {
    table: Table,
    config: AutoPlotConfig,
    types: ColumnTypeMap,
    pie_sectors: Vec<String>,
}

static_assertions::assert_impl_all!(AutoPlot: Send, Sync);

impl AutoPlot {
    /// Classify the table and find its pie-sized category columns.
    pub fn new(table: Table, config: AutoPlotConfig) -> Result<Self> {
        config.validate()?;
        let types = ColumnTypeMap::classify(table.frame());
        let pie_sectors = columns_with_distinct_values(
            table.frame(),
            &types,
            config.maximum_number_sectors,
            true,
        )?;
        debug!(
            "AutoPlot over {} columns, pie sector columns: {:?}",
            types.len(),
            pie_sectors
        );

        Ok(Self {
            table,
            config,
            types,
            pie_sectors,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &AutoPlotConfig {
        &self.config
    }

    pub fn column_types(&self) -> &ColumnTypeMap {
        &self.types
    }

    /// Category columns small enough to become pie sectors.
    pub fn pie_sectors(&self) -> &[String] {
        &self.pie_sectors
    }

    /// Chart kinds the table supports, regardless of the include flags.
    ///
    /// A timestamp row index also makes time series applicable.
    pub fn chart_types(&self) -> Vec<ChartKind> {
        let mut kinds = applicable_charts(&self.types, self.pie_sectors.len());
        if self.table.is_time_indexed()
            && !kinds.is_empty()
            && !kinds.contains(&ChartKind::Timeseries)
        {
            let at = kinds
                .iter()
                .position(|k| *k == ChartKind::Pie)
                .unwrap_or(kinds.len());
            kinds.insert(at, ChartKind::Timeseries);
        }
        kinds
    }

    fn is_enabled(&self, kind: ChartKind) -> bool {
        let config = &self.config;
        match kind {
            ChartKind::Pie => config.include_pie,
            ChartKind::Scatter => config.include_scatter,
            ChartKind::Histogram => config.include_histogram,
            ChartKind::Boxplot => config.include_box,
            ChartKind::Violin => config.include_violin,
            ChartKind::Treemap => config.include_treemap,
            ChartKind::Sunburst => config.include_sunburst,
            ChartKind::CorrelationMatrix => config.include_correlation,
            ChartKind::DensityContour | ChartKind::DensityHeatmap => config.include_density,
            ChartKind::Timeseries => config.include_timeseries,
        }
    }

    fn build(&self, kind: ChartKind) -> Result<Vec<charts::Chart>> {
        let table = &self.table;
        let types = &self.types;
        let config = &self.config;

        match kind {
            ChartKind::Pie => create_pie(
                table,
                types,
                types.numeric(),
                &self.pie_sectors,
                config.pie_chart_hole,
            ),
            ChartKind::Scatter => create_scatter(table, types, &ScatterOptions::from(config)),
            ChartKind::Histogram => create_histogram(
                table,
                types,
                types.numeric(),
                &HistogramOptions::from(config),
            ),
            ChartKind::Boxplot => create_box(table, types, &BoxOptions::from(config)),
            ChartKind::Violin => create_violin(table, types, &ViolinOptions::from(config)),
            ChartKind::Treemap => create_treemap(table, types, config.treemap_path_limit),
            ChartKind::Sunburst => create_sunburst(table, types, config.sunburst_path_limit),
            ChartKind::CorrelationMatrix => {
                create_correlation_plot(table, types, config.correlation_method)
            }
            ChartKind::DensityContour => create_density_chart(table, types, DensityStyle::Contour),
            ChartKind::DensityHeatmap => create_density_chart(table, types, DensityStyle::Heatmap),
            ChartKind::Timeseries => create_timeseries(table, types),
        }
    }

    /// Draw every applicable chart whose include flag is set.
    ///
    /// Charts follow the order of [`chart_types`](Self::chart_types). When
    /// `create_html` is set the report is also written to
    /// `<filename>.html`.
    pub fn show(&self) -> Result<Report> {
        let mut report = Report::new(&self.config.filename);

        for kind in self.chart_types() {
            if !self.is_enabled(kind) {
                debug!("{} charts disabled", kind);
                continue;
            }
            let charts = self.build(kind)?;
            debug!("Built {} {} charts", charts.len(), kind);
            report.extend(charts);
        }

        info!("AutoPlot produced {} charts", report.len());
        if self.config.create_html {
            report.write_html(&self.config.filename, self.config.write_mode)?;
        }
        Ok(report)
    }
}

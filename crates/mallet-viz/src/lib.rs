//! Rule-driven automatic chart generation for Polars tables.
//!
//! # Overview
//!
//! - **Eligibility**: [`applicable_charts`] maps a table's column types to the
//!   chart kinds it can support.
//! - **Selection**: helpers in [`selection`] pick numeric pairs, hierarchy
//!   paths, hover-name/color splits and low-cardinality columns.
//! - **Charts**: builders in [`charts`] turn a [`Table`](mallet_tabular::Table)
//!   into plotly [`Chart`]s, returning an empty list when the data cannot
//!   support them.
//! - **Reports**: [`Report`] renders charts into one standalone HTML page.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mallet_tabular::Table;
//! use mallet_viz::{AutoPlot, AutoPlotConfig};
//! use polars::prelude::*;
//!
//! let df = df!["A" => [1, 2, 3], "B" => [2, 4, 7], "C" => ["x", "y", "x"]]?;
//! let config = AutoPlotConfig::builder()
//!     .include_scatter(true)
//!     .filename("sales")
//!     .build()?;
//!
//! let autoplot = AutoPlot::new(Table::new(df), config)?;
//! println!("{:?}", autoplot.chart_types());
//!
//! // Writes sales.html
//! let report = autoplot.show()?;
//! ```

pub mod autoplot;
pub mod charts;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod report;
pub mod selection;

pub use autoplot::AutoPlot;
pub use charts::Chart;
pub use config::{
    AutoPlotConfig, AutoPlotConfigBuilder, DensityStyle, DisplayMode, HistFunc, HistNorm,
    Marginal, PointDisplay, WriteMode,
};
pub use eligibility::{ChartKind, applicable_charts};
pub use error::{Result, VizError};
pub use report::Report;

//! Column transformers over Polars tables.
//!
//! # Overview
//!
//! - **Classification**: [`ColumnTypeMap`] splits a frame's columns into
//!   numeric, object, boolean, categorical, datetime, datetime-tz and duration
//!   buckets.
//! - **Transformers**: configured operations implementing [`Transformer`]
//!   (column arithmetic, missing-value handling, rolling and resampling,
//!   group-by, one-hot encoding) that map one [`Table`] to another.
//! - **Correlation**: Pearson, Kendall and Spearman matrices over numeric
//!   columns.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mallet_tabular::transformers::{ColumnAdder, Resampler};
//! use mallet_tabular::{AggregationMethod, Table, Transformer};
//! use polars::prelude::*;
//!
//! let df = df!["A" => [1, 2, 3], "B" => [2, 4, 6]]?;
//! let table = ColumnAdder::new(["A", "B"], "Z")?.transform(&Table::new(df));
//!
//! // Without a datetime index this returns the table unchanged.
//! let resampled = Resampler::new("2H", AggregationMethod::Mean)?.transform(&table);
//! ```

pub mod columns;
pub mod config;
pub mod correlation;
pub mod error;
pub mod table;
pub mod transformers;
pub mod utils;

pub use columns::{ColumnTypeMap, SemanticType};
pub use config::{AggregationMethod, Axis, DropHow, FillMethod, FillValue, Frequency};
pub use correlation::{CorrelationMatrix, CorrelationMethod, correlation_matrix};
pub use error::{ConfigValidationError, Result, ResultExt, TabularError};
pub use table::Table;
pub use transformers::{TransformPipeline, Transformer};

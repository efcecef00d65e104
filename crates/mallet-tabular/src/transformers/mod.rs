//! Column transformers.
//!
//! Each transformer is configured once, validated at construction, and then
//! applied to any number of tables. Two entry points exist:
//!
//! - [`Transformer::apply`] is strict and reports unmet preconditions as errors.
//! - [`Transformer::transform`] fails closed: when the table does not meet the
//!   transformer's preconditions the input comes back unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use mallet_tabular::transformers::{ColumnAdder, NaFiller, TransformPipeline};
//! use mallet_tabular::{FillMethod, Table};
//!
//! let pipeline = TransformPipeline::new()
//!     .add(NaFiller::new(None, FillMethod::Mean, None)?)
//!     .add(ColumnAdder::new(["A", "B"], "Z")?);
//!
//! let out = pipeline.transform(&Table::new(df));
//! ```

mod arithmetic;
mod columns;
mod grouping;
mod imputation;
mod window;

pub use arithmetic::{ColumnAdder, ColumnMultiplier, ColumnSubtraction, FunctionTransformer};
pub use columns::{ColumnDropper, ColumnRename, ColumnSelector};
pub use grouping::{DummyEncoder, GroupbyTransformer};
pub use imputation::{ConstantValueFiller, DropPercentageMissing, FillSpec, NaDropper, NaFiller};
pub use window::{ExpandingTransformer, Resampler, RollingWindow, Window};

use crate::config::AggregationMethod;
use crate::error::{ConfigValidationError, Result, ResultExt};
use crate::table::Table;
use polars::prelude::*;
use tracing::debug;

/// A configured operation from one table to another.
pub trait Transformer: Send + Sync {
    /// Name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Apply the transformation, reporting unmet preconditions as errors.
    fn apply(&self, table: &Table) -> Result<Table>;

    /// Apply the transformation, returning the input unchanged on failure.
    fn transform(&self, table: &Table) -> Table {
        match self.apply(table) {
            Ok(out) => out,
            Err(e) => {
                debug!("{} not applied, returning input unchanged: {}", self.name(), e);
                table.clone()
            }
        }
    }
}

/// An ordered chain of transformers.
///
/// `transform` skips every step whose preconditions fail; `apply` stops at
/// the first failing step.
#[derive(Default)]
pub struct TransformPipeline {
    steps: Vec<Box<dyn Transformer>>,
}

static_assertions::assert_impl_all!(TransformPipeline: Send, Sync);

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn add<T: Transformer + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Append an already boxed step.
    pub fn push(&mut self, step: Box<dyn Transformer>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the steps in order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl Transformer for TransformPipeline {
    fn name(&self) -> &'static str {
        "TransformPipeline"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let mut current = table.clone();
        for step in &self.steps {
            current = step.apply(&current).context(step.name())?;
        }
        Ok(current)
    }

    fn transform(&self, table: &Table) -> Table {
        self.steps
            .iter()
            .fold(table.clone(), |current, step| step.transform(&current))
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Validate and own a non-empty list of column names.
pub(crate) fn column_list<I, S>(
    columns: I,
    field: &'static str,
) -> std::result::Result<Vec<String>, ConfigValidationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    if columns.is_empty() || columns.iter().any(|c| c.trim().is_empty()) {
        return Err(ConfigValidationError::Empty { field });
    }
    Ok(columns)
}

/// Validate and own a non-empty column name.
pub(crate) fn column_name(
    name: impl Into<String>,
    field: &'static str,
) -> std::result::Result<String, ConfigValidationError> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(ConfigValidationError::Empty { field });
    }
    Ok(name)
}

/// Build the aggregation expression for a column.
pub(crate) fn aggregate_expr(expr: Expr, method: AggregationMethod) -> Expr {
    match method {
        AggregationMethod::Mean => expr.mean(),
        AggregationMethod::Sum => expr.sum(),
        AggregationMethod::Min => expr.min(),
        AggregationMethod::Max => expr.max(),
        AggregationMethod::Std => expr.std(1),
        AggregationMethod::Var => expr.var(1),
    }
}

//! Dropping and filling missing values.

use super::{Transformer, column_list};
use crate::columns::{SemanticType, is_numeric_dtype};
use crate::config::{Axis, DropHow, FillMethod, FillValue};
use crate::error::{ConfigValidationError, Result, TabularError};
use crate::table::Table;
use crate::utils::{
    check_columns, check_numeric, fill_bool_nulls, fill_numeric_nulls, fill_string_nulls,
    percentage_missing, series,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn validate_limit(
    limit: Option<usize>,
) -> std::result::Result<Option<usize>, ConfigValidationError> {
    match limit {
        Some(0) => Err(ConfigValidationError::OutOfRange {
            field: "limit",
            value: "0".to_string(),
            reason: "must be positive",
        }),
        other => Ok(other),
    }
}

/// Keep only the named columns, preserving frame order.
fn keep_columns(df: &DataFrame, keep: &[String]) -> Result<DataFrame> {
    Ok(df.select(keep.iter().map(String::as_str))?)
}

// =============================================================================
// NaDropper
// =============================================================================

/// Drops rows or columns that contain missing values.
///
/// With `thresh`, a row or column is kept when it has at least that many
/// non-missing values and `how` is ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NaDropper {
    axis: Axis,
    how: DropHow,
    thresh: Option<usize>,
}

impl Default for NaDropper {
    fn default() -> Self {
        Self {
            axis: Axis::Columns,
            how: DropHow::All,
            thresh: None,
        }
    }
}

impl NaDropper {
    pub fn new(axis: Axis, how: DropHow, thresh: Option<usize>) -> Self {
        Self { axis, how, thresh }
    }

    fn keep(&self, non_null: usize, total: usize) -> bool {
        match (self.thresh, self.how) {
            (Some(thresh), _) => non_null >= thresh,
            (None, DropHow::Any) => non_null == total,
            (None, DropHow::All) => non_null > 0,
        }
    }

    fn drop_rows(&self, table: &Table) -> Result<Table> {
        let frame = table.frame();
        let mut counts = vec![0usize; frame.height()];
        for column in frame.get_columns() {
            let present = column.as_materialized_series().is_not_null();
            for (row, is_present) in (&present).into_iter().enumerate() {
                if is_present.unwrap_or(false) {
                    counts[row] += 1;
                }
            }
        }

        let keep: Vec<bool> = counts
            .into_iter()
            .map(|count| self.keep(count, frame.width()))
            .collect();
        let mask = BooleanChunked::from_slice("mask".into(), &keep);

        let filtered = frame.filter(&mask)?;
        match table.index() {
            Some(index) => Table::with_index(filtered, index.filter(&mask)?),
            None => Ok(Table::new(filtered)),
        }
    }

    fn drop_columns(&self, table: &Table) -> Result<Table> {
        let frame = table.frame();
        let height = frame.height();
        let keep: Vec<String> = frame
            .get_columns()
            .iter()
            .filter(|column| self.keep(height - column.null_count(), height))
            .map(|column| column.name().to_string())
            .collect();
        Ok(table.replace_frame(keep_columns(frame, &keep)?))
    }
}

impl Transformer for NaDropper {
    fn name(&self) -> &'static str {
        "NaDropper"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        match self.axis {
            Axis::Rows => self.drop_rows(table),
            Axis::Columns => self.drop_columns(table),
        }
    }
}

// =============================================================================
// NaFiller
// =============================================================================

/// Fills missing values by propagation or with the column mean.
///
/// For `bfill` and `ffill`, `limit` caps consecutive fills; for `mean` it caps
/// the number of fills per column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaFiller {
    columns: Option<Vec<String>>,
    method: FillMethod,
    limit: Option<usize>,
}

impl NaFiller {
    pub fn new(
        columns: Option<Vec<String>>,
        method: FillMethod,
        limit: Option<usize>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        let columns = columns.map(|c| column_list(c, "columns")).transpose()?;
        Ok(Self {
            columns,
            method,
            limit: validate_limit(limit)?,
        })
    }

    fn targets(&self, df: &DataFrame) -> Result<Vec<String>> {
        match (&self.columns, self.method) {
            (Some(columns), FillMethod::Mean) => {
                check_numeric(df, columns)?;
                Ok(columns.clone())
            }
            (Some(columns), _) => {
                check_columns(df, columns)?;
                Ok(columns.clone())
            }
            (None, FillMethod::Mean) => Ok(df
                .get_columns()
                .iter()
                .filter(|c| is_numeric_dtype(c.dtype()))
                .map(|c| c.name().to_string())
                .collect()),
            (None, _) => Ok(df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect()),
        }
    }

    fn fill(&self, column: &Series) -> Result<Option<Series>> {
        let limit = self.limit.map(|l| l as IdxSize);
        let filled = match self.method {
            FillMethod::Forward => column.fill_null(FillNullStrategy::Forward(limit))?,
            FillMethod::Backward => column.fill_null(FillNullStrategy::Backward(limit))?,
            FillMethod::Mean => match column.mean() {
                Some(mean) => fill_numeric_nulls(column, mean, self.limit)?,
                None => return Ok(None),
            },
        };
        Ok(Some(filled))
    }
}

impl Transformer for NaFiller {
    fn name(&self) -> &'static str {
        "NaFiller"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let mut frame = table.frame().clone();
        for name in self.targets(table.frame())? {
            let column = series(table.frame(), &name)?;
            if column.null_count() == 0 {
                continue;
            }
            match self.fill(column)? {
                Some(filled) => {
                    frame.replace(&name, filled)?;
                }
                None => debug!("Column '{}' has no values to average, left unfilled", name),
            }
        }
        Ok(table.replace_frame(frame))
    }
}

// =============================================================================
// ConstantValueFiller
// =============================================================================

/// What a [`ConstantValueFiller`] fills with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillSpec {
    /// One value for every column of a compatible type.
    Scalar(FillValue),
    /// A value per named column.
    PerColumn(Vec<(String, FillValue)>),
}

/// Fills missing values with constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantValueFiller {
    value: FillSpec,
    limit: Option<usize>,
}

impl ConstantValueFiller {
    pub fn new(
        value: FillSpec,
        limit: Option<usize>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        if let FillSpec::PerColumn(map) = &value {
            if map.is_empty() {
                return Err(ConfigValidationError::Empty { field: "value" });
            }
        }
        Ok(Self {
            value,
            limit: validate_limit(limit)?,
        })
    }

    /// Fill every compatible column with one value.
    pub fn scalar(
        value: impl Into<FillValue>,
        limit: Option<usize>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        Self::new(FillSpec::Scalar(value.into()), limit)
    }

    /// Fill named columns with their own values.
    pub fn per_column<I, S, V>(
        values: I,
        limit: Option<usize>,
    ) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<FillValue>,
    {
        let map = values
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self::new(FillSpec::PerColumn(map), limit)
    }

    fn fill_column(&self, name: &str, column: &Series, value: &FillValue) -> Result<Series> {
        let ty = SemanticType::of(column.dtype());
        let filled = match (value, ty) {
            (FillValue::Number(v), SemanticType::Numeric) => {
                fill_numeric_nulls(column, *v, self.limit)?
            }
            (FillValue::Bool(v), SemanticType::Boolean) => {
                fill_bool_nulls(column, *v, self.limit)?
            }
            (FillValue::Text(v), SemanticType::Object | SemanticType::Categorical) => {
                fill_string_nulls(column, v, self.limit)?
            }
            (value, ty) => {
                let expected = match value {
                    FillValue::Number(_) => "numeric",
                    FillValue::Bool(_) => "boolean",
                    FillValue::Text(_) => "object",
                };
                return Err(TabularError::TypeMismatch {
                    column: name.to_string(),
                    expected: expected.to_string(),
                    found: ty.tag().to_string(),
                });
            }
        };
        Ok(filled)
    }
}

impl Transformer for ConstantValueFiller {
    fn name(&self) -> &'static str {
        "ConstantValueFiller"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let source = table.frame();
        let mut frame = source.clone();

        match &self.value {
            FillSpec::Scalar(value) => {
                let wanted = match value {
                    FillValue::Number(_) => SemanticType::Numeric,
                    FillValue::Bool(_) => SemanticType::Boolean,
                    FillValue::Text(_) => SemanticType::Object,
                };
                for column in source.get_columns() {
                    let series = column.as_materialized_series();
                    if SemanticType::of(series.dtype()) != wanted || series.null_count() == 0 {
                        continue;
                    }
                    let name = column.name().to_string();
                    let filled = self.fill_column(&name, series, value)?;
                    frame.replace(&name, filled)?;
                }
            }
            FillSpec::PerColumn(map) => {
                let names: Vec<String> = map.iter().map(|(name, _)| name.clone()).collect();
                check_columns(source, &names)?;
                for (name, value) in map {
                    let filled = self.fill_column(name, series(source, name)?, value)?;
                    frame.replace(name, filled)?;
                }
            }
        }

        Ok(table.replace_frame(frame))
    }
}

// =============================================================================
// DropPercentageMissing
// =============================================================================

/// Drops columns whose share of missing values is at or above a threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DropPercentageMissing {
    threshold: f64,
}

impl Default for DropPercentageMissing {
    fn default() -> Self {
        Self { threshold: 50.0 }
    }
}

impl DropPercentageMissing {
    /// `threshold` is a percentage between 0 and 100.
    pub fn new(threshold: f64) -> std::result::Result<Self, ConfigValidationError> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigValidationError::OutOfRange {
                field: "threshold",
                value: threshold.to_string(),
                reason: "must be between 0 and 100",
            });
        }
        Ok(Self { threshold })
    }
}

impl Transformer for DropPercentageMissing {
    fn name(&self) -> &'static str {
        "DropPercentageMissing"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let keep: Vec<String> = percentage_missing(table.frame())
            .into_iter()
            .filter_map(|(name, pct)| (pct < self.threshold).then_some(name))
            .collect();
        Ok(table.replace_frame(keep_columns(table.frame(), &keep)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{numeric_values, string_values};
    use pretty_assertions::assert_eq;

    fn df2() -> DataFrame {
        df![
            "A" => [None, Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(8.0)],
            "B" => [Some(2.0), None, None, None, Some(10.0), Some(9.0)],
            "C" => [Some(1.0), Some(3.0), Some(5.0), None, None, Some(7.0)],
        ]
        .unwrap()
    }

    fn df_mixed() -> DataFrame {
        df![
            "A" => [None, Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            "B" => [Some(2.0), None, None, None, Some(10.0)],
            "C" => ["dog", "cat", "sheep", "dog", "cat"],
            "E" => [true, true, false, true, true],
        ]
        .unwrap()
    }

    fn values(table: &Table, name: &str) -> Vec<Option<f64>> {
        numeric_values(series(table.frame(), name).unwrap()).unwrap()
    }

    // ==== NaDropper tests ====

    #[test]
    fn test_dropper_columns_any() {
        let dropper = NaDropper::new(Axis::Columns, DropHow::Any, None);
        let out = dropper.transform(&Table::new(df_mixed()));
        assert_eq!(out.column_names(), vec!["C".to_string(), "E".to_string()]);
    }

    #[test]
    fn test_dropper_rows_any() {
        let dropper = NaDropper::new(Axis::Rows, DropHow::Any, None);
        let out = dropper.transform(&Table::new(df_mixed()));
        assert_eq!(out.height(), 1);
        assert_eq!(values(&out, "B"), vec![Some(10.0)]);
    }

    #[test]
    fn test_dropper_rows_thresh() {
        let dropper = NaDropper::new(Axis::Rows, DropHow::Any, Some(2));
        let out = dropper.transform(&Table::new(df2()));
        assert_eq!(out.height(), 5);
    }

    #[test]
    fn test_dropper_default_keeps_partially_missing_columns() {
        let out = NaDropper::default().transform(&Table::new(df2()));
        assert_eq!(out.width(), 3);
    }

    // ==== NaFiller tests ====

    #[test]
    fn test_mean_fill() {
        let filler = NaFiller::new(None, FillMethod::Mean, None).unwrap();
        let out = filler.transform(&Table::new(df2()));

        let a = values(&out, "A");
        assert!((a[0].unwrap() - 4.4).abs() < 1e-12);
        assert_eq!(values(&out, "B")[1], Some(7.0));
        assert_eq!(values(&out, "C")[3], Some(4.0));
    }

    #[test]
    fn test_mean_fill_with_columns_and_limit() {
        let filler =
            NaFiller::new(Some(vec!["B".into(), "C".into()]), FillMethod::Mean, Some(1)).unwrap();
        let out = filler.transform(&Table::new(df2()));

        assert_eq!(values(&out, "A")[0], None);
        assert_eq!(
            values(&out, "B"),
            vec![Some(2.0), Some(7.0), None, None, Some(10.0), Some(9.0)]
        );
        assert_eq!(
            values(&out, "C"),
            vec![Some(1.0), Some(3.0), Some(5.0), Some(4.0), None, Some(7.0)]
        );
    }

    #[test]
    fn test_mean_fill_on_text_column_is_noop() {
        let filler = NaFiller::new(Some(vec!["A".into(), "C".into()]), FillMethod::Mean, None).unwrap();
        let input = Table::new(df_mixed());
        let out = filler.transform(&input);
        assert!(out.frame().equals_missing(input.frame()));
    }

    #[test]
    fn test_backward_fill() {
        let filler = NaFiller::new(None, FillMethod::Backward, None).unwrap();
        let out = filler.transform(&Table::new(df2()));
        assert_eq!(
            values(&out, "B"),
            vec![Some(2.0), Some(10.0), Some(10.0), Some(10.0), Some(10.0), Some(9.0)]
        );
        assert_eq!(values(&out, "C")[3], Some(7.0));
    }

    #[test]
    fn test_forward_fill_with_limit() {
        let filler = NaFiller::new(None, FillMethod::Forward, Some(1)).unwrap();
        let out = filler.transform(&Table::new(df2()));
        assert_eq!(values(&out, "A")[0], None);
        assert_eq!(
            values(&out, "B"),
            vec![Some(2.0), Some(2.0), None, None, Some(10.0), Some(9.0)]
        );
    }

    #[test]
    fn test_forward_fill_missing_column_is_noop() {
        let filler = NaFiller::new(Some(vec!["Q".into()]), FillMethod::Forward, None).unwrap();
        let input = Table::new(df2());
        let out = filler.transform(&input);
        assert!(out.frame().equals_missing(input.frame()));
    }

    #[test]
    fn test_filler_rejects_zero_limit() {
        assert!(NaFiller::new(None, FillMethod::Forward, Some(0)).is_err());
    }

    // ==== ConstantValueFiller tests ====

    #[test]
    fn test_constant_per_column_with_limit() {
        let filler =
            ConstantValueFiller::per_column([("A", 100.0), ("B", 200.0), ("C", 300.0)], Some(1)).unwrap();
        let out = filler.transform(&Table::new(df2()));

        assert_eq!(values(&out, "A")[0], Some(100.0));
        assert_eq!(
            values(&out, "B"),
            vec![Some(2.0), Some(200.0), None, None, Some(10.0), Some(9.0)]
        );
        assert_eq!(
            values(&out, "C"),
            vec![Some(1.0), Some(3.0), Some(5.0), Some(300.0), None, Some(7.0)]
        );
    }

    #[test]
    fn test_constant_scalar_fills_numeric_only() {
        let mut df = df_mixed();
        df.replace("C", Series::new("C".into(), &[Some("dog"), None, None, Some("dog"), Some("cat")]))
            .unwrap();

        let out = ConstantValueFiller::scalar(200.0, None)
            .unwrap()
            .transform(&Table::new(df));

        assert_eq!(series(out.frame(), "A").unwrap().null_count(), 0);
        assert_eq!(series(out.frame(), "B").unwrap().null_count(), 0);
        assert_eq!(series(out.frame(), "C").unwrap().null_count(), 2);
    }

    #[test]
    fn test_constant_scalar_text() {
        let df = df!["C" => [Some("dog"), None], "A" => [None, Some(1.0)]].unwrap();
        let out = ConstantValueFiller::scalar("unknown", None)
            .unwrap()
            .transform(&Table::new(df));

        assert_eq!(
            string_values(series(out.frame(), "C").unwrap()).unwrap(),
            vec![Some("dog".to_string()), Some("unknown".to_string())]
        );
        assert_eq!(values(&out, "A")[0], None);
    }

    #[test]
    fn test_constant_unknown_key_is_noop() {
        let filler = ConstantValueFiller::per_column([("A", 1.0), ("Q", 2.0)], None).unwrap();
        let input = Table::new(df2());
        let out = filler.transform(&input);
        assert!(out.frame().equals_missing(input.frame()));
    }

    // ==== DropPercentageMissing tests ====

    #[test]
    fn test_drop_percentage_missing() {
        let out = DropPercentageMissing::new(20.0)
            .unwrap()
            .transform(&Table::new(df_mixed()));
        assert_eq!(out.column_names(), vec!["C".to_string(), "E".to_string()]);
    }

    #[test]
    fn test_drop_percentage_threshold_inclusive() {
        // B is exactly 60% missing
        let out = DropPercentageMissing::new(60.0)
            .unwrap()
            .transform(&Table::new(df_mixed()));
        assert_eq!(
            out.column_names(),
            vec!["A".to_string(), "C".to_string(), "E".to_string()]
        );
    }

    #[test]
    fn test_drop_percentage_rejects_out_of_range() {
        assert!(DropPercentageMissing::new(150.0).is_err());
    }
}

//! Group-by aggregation and one-hot encoding.

use super::{Transformer, aggregate_expr, column_list};
use crate::columns::{ColumnTypeMap, is_numeric_dtype};
use crate::config::AggregationMethod;
use crate::error::{ConfigValidationError, Result};
use crate::table::Table;
use crate::utils::{check_categorical, check_columns, series, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Groups rows by key columns and aggregates the numeric rest.
///
/// Groups appear in order of first appearance; the keys become the leading
/// columns of the result and the row index is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupbyTransformer {
    keys: Vec<String>,
    aggregation: AggregationMethod,
}

impl GroupbyTransformer {
    pub fn new<I, S>(
        keys: I,
        aggregation: AggregationMethod,
    ) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            keys: column_list(keys, "keys")?,
            aggregation,
        })
    }
}

impl Transformer for GroupbyTransformer {
    fn name(&self) -> &'static str {
        "GroupbyTransformer"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let df = table.frame();
        check_columns(df, &self.keys)?;

        let keys: Vec<Expr> = self.keys.iter().map(|k| col(k.as_str())).collect();
        let aggs: Vec<Expr> = df
            .get_columns()
            .iter()
            .filter(|c| is_numeric_dtype(c.dtype()))
            .map(|c| c.name().as_str())
            .filter(|name| !self.keys.iter().any(|k| k.as_str() == *name))
            .map(|name| aggregate_expr(col(name), self.aggregation).alias(name))
            .collect();

        let grouped = df.clone().lazy().group_by_stable(keys).agg(aggs).collect()?;
        Ok(Table::new(grouped))
    }
}

/// One-hot encodes category columns into `UInt8` indicator columns.
///
/// Indicators are named `<column><separator><value>`, ordered by value, and
/// appended after the untouched columns. Missing values encode as all zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyEncoder {
    columns: Option<Vec<String>>,
    separator: String,
    drop_first: bool,
}

impl Default for DummyEncoder {
    fn default() -> Self {
        Self {
            columns: None,
            separator: "_".to_string(),
            drop_first: false,
        }
    }
}

impl DummyEncoder {
    /// Encode the given columns, or every category column when `None`.
    pub fn new(
        columns: Option<Vec<String>>,
        separator: impl Into<String>,
        drop_first: bool,
    ) -> std::result::Result<Self, ConfigValidationError> {
        Ok(Self {
            columns: columns.map(|c| column_list(c, "columns")).transpose()?,
            separator: separator.into(),
            drop_first,
        })
    }

    fn targets(&self, df: &DataFrame) -> Result<Vec<String>> {
        match &self.columns {
            Some(columns) => {
                check_categorical(df, columns)?;
                Ok(columns.clone())
            }
            None => Ok(ColumnTypeMap::classify(df).categorical_set()),
        }
    }

    fn indicators(&self, name: &str, column: &Series) -> Result<Vec<Series>> {
        let values = string_values(column)?;
        let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();

        Ok(categories
            .into_iter()
            .skip(usize::from(self.drop_first))
            .map(|category| {
                let flags: Vec<u8> = values
                    .iter()
                    .map(|v| u8::from(v.as_deref() == Some(category)))
                    .collect();
                let label = format!("{}{}{}", name, self.separator, category);
                Series::new(label.into(), flags)
            })
            .collect())
    }
}

impl Transformer for DummyEncoder {
    fn name(&self) -> &'static str {
        "DummyEncoder"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let df = table.frame();
        let targets = self.targets(df)?;

        let mut dummies = Vec::new();
        for name in &targets {
            dummies.extend(self.indicators(name, series(df, name)?)?);
        }

        let kept: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .filter(|name| !targets.iter().any(|t| t.as_str() == *name))
            .collect();
        let mut frame = df.select(kept)?;
        for dummy in dummies {
            frame.with_column(dummy)?;
        }
        Ok(table.replace_frame(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::numeric_values;
    use pretty_assertions::assert_eq;

    fn sales() -> DataFrame {
        df![
            "store" => ["b", "a", "b", "a", "c"],
            "open" => [true, true, false, true, true],
            "units" => [1i64, 2, 3, 4, 5],
            "price" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap()
    }

    // ==== GroupbyTransformer tests ====

    #[test]
    fn test_groupby_sum_first_appearance_order() {
        let grouper = GroupbyTransformer::new(["store"], AggregationMethod::Sum).unwrap();
        let out = grouper.apply(&Table::new(sales())).unwrap();

        assert_eq!(
            out.column_names(),
            vec!["store".to_string(), "units".to_string(), "price".to_string()]
        );
        let stores = string_values(series(out.frame(), "store").unwrap()).unwrap();
        assert_eq!(
            stores,
            vec![Some("b".to_string()), Some("a".to_string()), Some("c".to_string())]
        );
        assert_eq!(
            numeric_values(series(out.frame(), "units").unwrap()).unwrap(),
            vec![Some(4.0), Some(6.0), Some(5.0)]
        );
    }

    #[test]
    fn test_groupby_mean() {
        let grouper = GroupbyTransformer::new(["store"], AggregationMethod::Mean).unwrap();
        let out = grouper.apply(&Table::new(sales())).unwrap();
        assert_eq!(
            numeric_values(series(out.frame(), "price").unwrap()).unwrap(),
            vec![Some(2.0), Some(3.0), Some(5.0)]
        );
    }

    #[test]
    fn test_groupby_missing_key_is_noop() {
        let grouper = GroupbyTransformer::new(["region"], AggregationMethod::Sum).unwrap();
        let out = grouper.transform(&Table::new(sales()));
        assert_eq!(out.height(), 5);
    }

    // ==== DummyEncoder tests ====

    #[test]
    fn test_dummies_for_named_column() {
        let encoder = DummyEncoder::new(Some(vec!["store".into()]), "_", false).unwrap();
        let out = encoder.apply(&Table::new(sales())).unwrap();

        assert_eq!(
            out.column_names(),
            vec![
                "open".to_string(),
                "units".to_string(),
                "price".to_string(),
                "store_a".to_string(),
                "store_b".to_string(),
                "store_c".to_string(),
            ]
        );
        let store_a = series(out.frame(), "store_a").unwrap();
        assert_eq!(store_a.dtype(), &DataType::UInt8);
        assert_eq!(
            numeric_values(store_a).unwrap(),
            vec![Some(0.0), Some(1.0), Some(0.0), Some(1.0), Some(0.0)]
        );
    }

    #[test]
    fn test_dummies_drop_first_all_categories() {
        let encoder = DummyEncoder::new(None, "=", true).unwrap();
        let out = encoder.apply(&Table::new(sales())).unwrap();
        assert_eq!(
            out.column_names(),
            vec![
                "units".to_string(),
                "price".to_string(),
                "open=true".to_string(),
                "store=b".to_string(),
                "store=c".to_string(),
            ]
        );
    }

    #[test]
    fn test_dummies_on_numeric_is_noop() {
        let encoder = DummyEncoder::new(Some(vec!["units".into()]), "_", false).unwrap();
        let out = encoder.transform(&Table::new(sales()));
        assert_eq!(out.width(), 4);
    }
}

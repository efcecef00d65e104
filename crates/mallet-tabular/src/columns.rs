//! Column classification into semantic types.
//!
//! Every column of a frame lands in exactly one bucket of a [`ColumnTypeMap`].
//! Classification is a single dispatch on the Polars dtype, so the buckets are
//! disjoint by construction.

use crate::error::{Result, TabularError};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Numeric,
    Object,
    Boolean,
    Categorical,
    Datetime,
    #[serde(rename = "datetimetz")]
    DatetimeTz,
    #[serde(rename = "timedelta")]
    Duration,
}

impl SemanticType {
    /// All tags in declaration order.
    pub const ALL: [SemanticType; 7] = [
        SemanticType::Numeric,
        SemanticType::Object,
        SemanticType::Boolean,
        SemanticType::Categorical,
        SemanticType::Datetime,
        SemanticType::DatetimeTz,
        SemanticType::Duration,
    ];

    /// Classify a dtype.
    ///
    /// Precedence: numeric, boolean, categorical, datetime, datetime with time
    /// zone, duration. Anything else is an object column.
    pub fn of(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            return SemanticType::Numeric;
        }
        match dtype {
            DataType::Boolean => SemanticType::Boolean,
            DataType::Categorical(_, _) | DataType::Enum(_, _) => SemanticType::Categorical,
            DataType::Datetime(_, None) | DataType::Date => SemanticType::Datetime,
            DataType::Datetime(_, Some(_)) => SemanticType::DatetimeTz,
            DataType::Duration(_) => SemanticType::Duration,
            _ => SemanticType::Object,
        }
    }

    /// Stable lowercase tag.
    pub fn tag(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Object => "object",
            SemanticType::Boolean => "boolean",
            SemanticType::Categorical => "categorical",
            SemanticType::Datetime => "datetime",
            SemanticType::DatetimeTz => "datetimetz",
            SemanticType::Duration => "timedelta",
        }
    }

    /// Whether values of this type can be used as chart categories.
    pub fn is_categorical_like(&self) -> bool {
        matches!(
            self,
            SemanticType::Categorical | SemanticType::Boolean | SemanticType::Object
        )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Check if a DataType is numeric (integer, float or decimal).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal(_, _)
    )
}

/// Column names partitioned by semantic type, each list in frame order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnTypeMap {
    numeric: Vec<String>,
    object: Vec<String>,
    boolean: Vec<String>,
    categorical: Vec<String>,
    datetime: Vec<String>,
    #[serde(rename = "datetimetz")]
    datetime_tz: Vec<String>,
    #[serde(rename = "timedelta")]
    duration: Vec<String>,
}

impl ColumnTypeMap {
    /// Classify every column of a frame.
    pub fn classify(df: &DataFrame) -> Self {
        let mut map = ColumnTypeMap::default();
        for column in df.get_columns() {
            let name = column.name().to_string();
            map.bucket_mut(SemanticType::of(column.dtype())).push(name);
        }
        map
    }

    /// Look up the semantic type of a single column.
    pub fn type_of(df: &DataFrame, name: &str) -> Result<SemanticType> {
        df.column(name)
            .map(|column| SemanticType::of(column.dtype()))
            .map_err(|_| TabularError::ColumnNotFound(name.to_string()))
    }

    fn bucket_mut(&mut self, ty: SemanticType) -> &mut Vec<String> {
        match ty {
            SemanticType::Numeric => &mut self.numeric,
            SemanticType::Object => &mut self.object,
            SemanticType::Boolean => &mut self.boolean,
            SemanticType::Categorical => &mut self.categorical,
            SemanticType::Datetime => &mut self.datetime,
            SemanticType::DatetimeTz => &mut self.datetime_tz,
            SemanticType::Duration => &mut self.duration,
        }
    }

    /// Columns of one semantic type.
    pub fn columns(&self, ty: SemanticType) -> &[String] {
        match ty {
            SemanticType::Numeric => &self.numeric,
            SemanticType::Object => &self.object,
            SemanticType::Boolean => &self.boolean,
            SemanticType::Categorical => &self.categorical,
            SemanticType::Datetime => &self.datetime,
            SemanticType::DatetimeTz => &self.datetime_tz,
            SemanticType::Duration => &self.duration,
        }
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn object(&self) -> &[String] {
        &self.object
    }

    pub fn boolean(&self) -> &[String] {
        &self.boolean
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn datetime(&self) -> &[String] {
        &self.datetime
    }

    pub fn datetime_tz(&self) -> &[String] {
        &self.datetime_tz
    }

    pub fn duration(&self) -> &[String] {
        &self.duration
    }

    /// Datetime columns with the time-zone aware ones folded in.
    pub fn datetime_merged(&self) -> Vec<String> {
        self.datetime
            .iter()
            .chain(self.datetime_tz.iter())
            .cloned()
            .collect()
    }

    /// Categorical, then boolean, then object columns.
    pub fn categorical_set(&self) -> Vec<String> {
        self.categorical
            .iter()
            .chain(self.boolean.iter())
            .chain(self.object.iter())
            .cloned()
            .collect()
    }

    /// Find which bucket holds a column.
    pub fn find(&self, name: &str) -> Option<SemanticType> {
        SemanticType::ALL
            .into_iter()
            .find(|ty| self.columns(*ty).iter().any(|c| c == name))
    }

    /// Total number of classified columns.
    pub fn len(&self) -> usize {
        SemanticType::ALL
            .iter()
            .map(|ty| self.columns(*ty).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mixed_frame() -> DataFrame {
        let mut df = df![
            "A" => [1i64, 2, 3],
            "B" => [1.5f64, 2.5, 3.5],
            "C" => ["x", "y", "z"],
            "E" => [true, false, true],
        ]
        .unwrap();
        let when = Series::new("when".into(), &[0i64, 86_400_000, 172_800_000])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let lag = Series::new("lag".into(), &[1_000i64, 2_000, 3_000])
            .cast(&DataType::Duration(TimeUnit::Milliseconds))
            .unwrap();
        df.with_column(when).unwrap();
        df.with_column(lag).unwrap();
        df
    }

    // ==== SemanticType::of() tests ====

    #[test]
    fn test_semantic_type_precedence() {
        assert_eq!(SemanticType::of(&DataType::Int32), SemanticType::Numeric);
        assert_eq!(SemanticType::of(&DataType::Float64), SemanticType::Numeric);
        assert_eq!(SemanticType::of(&DataType::Boolean), SemanticType::Boolean);
        assert_eq!(SemanticType::of(&DataType::Date), SemanticType::Datetime);
        assert_eq!(
            SemanticType::of(&DataType::Duration(TimeUnit::Microseconds)),
            SemanticType::Duration
        );
        assert_eq!(SemanticType::of(&DataType::String), SemanticType::Object);
        assert_eq!(SemanticType::of(&DataType::Time), SemanticType::Object);
    }

    #[test]
    fn test_tags() {
        assert_eq!(SemanticType::DatetimeTz.tag(), "datetimetz");
        assert_eq!(SemanticType::Duration.tag(), "timedelta");
        assert_eq!(SemanticType::Numeric.to_string(), "numeric");
    }

    // ==== ColumnTypeMap::classify() tests ====

    #[test]
    fn test_classify_partitions_columns() {
        let df = mixed_frame();
        let types = ColumnTypeMap::classify(&df);

        assert_eq!(types.numeric(), &["A".to_string(), "B".to_string()]);
        assert_eq!(types.object(), &["C".to_string()]);
        assert_eq!(types.boolean(), &["E".to_string()]);
        assert_eq!(types.datetime(), &["when".to_string()]);
        assert_eq!(types.duration(), &["lag".to_string()]);
        assert!(types.categorical().is_empty());
        assert_eq!(types.len(), df.width());
    }

    #[test]
    fn test_find_reports_bucket() {
        let types = ColumnTypeMap::classify(&mixed_frame());
        assert_eq!(types.find("C"), Some(SemanticType::Object));
        assert_eq!(types.find("lag"), Some(SemanticType::Duration));
        assert_eq!(types.find("when"), Some(SemanticType::Datetime));
        assert_eq!(types.find("missing"), None);
    }

    #[test]
    fn test_every_column_in_exactly_one_bucket() {
        let df = mixed_frame();
        let types = ColumnTypeMap::classify(&df);

        for name in df.get_column_names() {
            let hits = SemanticType::ALL
                .iter()
                .filter(|ty| types.columns(**ty).iter().any(|c| c == name.as_str()))
                .count();
            assert_eq!(hits, 1, "column {name} classified {hits} times");
        }
    }

    #[test]
    fn test_categorical_set_order() {
        let df = mixed_frame();
        let types = ColumnTypeMap::classify(&df);
        assert_eq!(
            types.categorical_set(),
            vec!["E".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_datetime_merged_without_tz() {
        let types = ColumnTypeMap::classify(&mixed_frame());
        assert_eq!(types.datetime_merged(), vec!["when".to_string()]);
    }

    #[test]
    fn test_type_of() {
        let df = mixed_frame();
        assert_eq!(
            ColumnTypeMap::type_of(&df, "E").unwrap(),
            SemanticType::Boolean
        );
        assert!(matches!(
            ColumnTypeMap::type_of(&df, "missing"),
            Err(TabularError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_classify_empty_frame() {
        let types = ColumnTypeMap::classify(&DataFrame::empty());
        assert!(types.is_empty());
    }

    #[test]
    fn test_serialize_uses_tags() {
        let types = ColumnTypeMap::classify(&mixed_frame());
        let json = serde_json::to_value(&types).unwrap();
        assert_eq!(json["timedelta"][0], "lag");
        assert!(json["datetimetz"].as_array().unwrap().is_empty());
    }
}

//! Configuration enums shared by the column transformers.
//!
//! Every enum parses from the lowercase names callers already use
//! (`"ffill"`, `"variance"`, `"columns"`) through [`FromStr`], and serializes to
//! the same names.

use crate::error::ConfigValidationError;
use once_cell::sync::Lazy;
use polars::prelude::Duration;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How missing values are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FillMethod {
    /// Propagate the next valid value backward
    #[serde(rename = "bfill")]
    Backward,
    /// Propagate the last valid value forward
    #[default]
    #[serde(rename = "ffill")]
    Forward,
    /// Replace with the column mean
    #[serde(rename = "mean")]
    Mean,
}

impl FillMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMethod::Backward => "bfill",
            FillMethod::Forward => "ffill",
            FillMethod::Mean => "mean",
        }
    }
}

impl FromStr for FillMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfill" | "backfill" => Ok(FillMethod::Backward),
            "ffill" | "pad" => Ok(FillMethod::Forward),
            "mean" => Ok(FillMethod::Mean),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "fill method",
                value: s.to_string(),
                expected: "bfill, ffill, mean",
            }),
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation applied to a window or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    #[default]
    Mean,
    Sum,
    Min,
    Max,
    /// Sample standard deviation (ddof = 1)
    Std,
    /// Sample variance (ddof = 1)
    #[serde(alias = "variance")]
    Var,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Mean => "mean",
            AggregationMethod::Sum => "sum",
            AggregationMethod::Min => "min",
            AggregationMethod::Max => "max",
            AggregationMethod::Std => "std",
            AggregationMethod::Var => "var",
        }
    }
}

impl FromStr for AggregationMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(AggregationMethod::Mean),
            "sum" => Ok(AggregationMethod::Sum),
            "min" => Ok(AggregationMethod::Min),
            "max" => Ok(AggregationMethod::Max),
            "std" => Ok(AggregationMethod::Std),
            "var" | "variance" => Ok(AggregationMethod::Var),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "aggregation method",
                value: s.to_string(),
                expected: "mean, sum, min, max, std, var",
            }),
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which axis an operation walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    #[serde(alias = "index")]
    Rows,
    Columns,
}

impl FromStr for Axis {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "index" | "rows" => Ok(Axis::Rows),
            "1" | "columns" => Ok(Axis::Columns),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "axis",
                value: s.to_string(),
                expected: "0, index, rows, 1, columns",
            }),
        }
    }
}

/// Whether any or all values must be missing for a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DropHow {
    #[default]
    Any,
    All,
}

impl FromStr for DropHow {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(DropHow::Any),
            "all" => Ok(DropHow::All),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "drop rule",
                value: s.to_string(),
                expected: "any, all",
            }),
        }
    }
}

/// A constant used to fill missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        FillValue::Number(value)
    }
}

impl From<i64> for FillValue {
    fn from(value: i64) -> Self {
        FillValue::Number(value as f64)
    }
}

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        FillValue::Bool(value)
    }
}

impl From<&str> for FillValue {
    fn from(value: &str) -> Self {
        FillValue::Text(value.to_string())
    }
}

// =============================================================================
// Frequency
// =============================================================================

static FREQUENCY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d*)\s*(MS|ME|M|QS|QE|Q|YS|YE|Y|AS|A|W|D|H|h|T|min|S|s|L|ms|U|us|N|ns)\s*$")
        .expect("Invalid regex: frequency pattern")
});

/// Time unit of a [`Frequency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl FrequencyUnit {
    fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "Y" | "YS" | "YE" | "A" | "AS" => Some(FrequencyUnit::Year),
            "Q" | "QS" | "QE" => Some(FrequencyUnit::Quarter),
            "M" | "MS" | "ME" => Some(FrequencyUnit::Month),
            "W" => Some(FrequencyUnit::Week),
            "D" => Some(FrequencyUnit::Day),
            "H" | "h" => Some(FrequencyUnit::Hour),
            "T" | "min" => Some(FrequencyUnit::Minute),
            "S" | "s" => Some(FrequencyUnit::Second),
            "L" | "ms" => Some(FrequencyUnit::Millisecond),
            "U" | "us" => Some(FrequencyUnit::Microsecond),
            "N" | "ns" => Some(FrequencyUnit::Nanosecond),
            _ => None,
        }
    }

    fn polars_suffix(&self) -> &'static str {
        match self {
            FrequencyUnit::Year => "y",
            FrequencyUnit::Quarter => "q",
            FrequencyUnit::Month => "mo",
            FrequencyUnit::Week => "w",
            FrequencyUnit::Day => "d",
            FrequencyUnit::Hour => "h",
            FrequencyUnit::Minute => "m",
            FrequencyUnit::Second => "s",
            FrequencyUnit::Millisecond => "ms",
            FrequencyUnit::Microsecond => "us",
            FrequencyUnit::Nanosecond => "ns",
        }
    }

    /// Months per unit, for calendar units.
    fn months(&self) -> Option<u32> {
        match self {
            FrequencyUnit::Year => Some(12),
            FrequencyUnit::Quarter => Some(3),
            FrequencyUnit::Month => Some(1),
            _ => None,
        }
    }

    /// Fixed length in nanoseconds. `None` for calendar units.
    fn nanoseconds(&self) -> Option<i64> {
        match self {
            FrequencyUnit::Year | FrequencyUnit::Quarter | FrequencyUnit::Month => None,
            FrequencyUnit::Week => Some(7 * 86_400_000_000_000),
            FrequencyUnit::Day => Some(86_400_000_000_000),
            FrequencyUnit::Hour => Some(3_600_000_000_000),
            FrequencyUnit::Minute => Some(60_000_000_000),
            FrequencyUnit::Second => Some(1_000_000_000),
            FrequencyUnit::Millisecond => Some(1_000_000),
            FrequencyUnit::Microsecond => Some(1_000),
            FrequencyUnit::Nanosecond => Some(1),
        }
    }
}

/// A time span written as an offset alias such as `"2H"`, `"15min"` or `"1M"`.
///
/// Windows are labelled by their start. `W` windows run Monday to Sunday and
/// carry the Monday, unlike pandas' `W-SUN` which labels the Sunday. Month,
/// quarter and year aliases (`M`/`MS`/`ME`, `Q`, `Y`/`A`) all map to
/// calendar windows starting on the first day of the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    count: u32,
    unit: FrequencyUnit,
}

impl Frequency {
    pub fn new(count: u32, unit: FrequencyUnit) -> Result<Self, ConfigValidationError> {
        if count == 0 {
            return Err(ConfigValidationError::OutOfRange {
                field: "frequency",
                value: count.to_string(),
                reason: "must be positive",
            });
        }
        Ok(Self { count, unit })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// Polars duration string, e.g. `"2h"`.
    pub fn polars_string(&self) -> String {
        format!("{}{}", self.count, self.unit.polars_suffix())
    }

    /// Polars duration. Always well formed because the parts are validated.
    pub fn to_duration(&self) -> Duration {
        Duration::parse(&self.polars_string())
    }

    /// Length of the span in nanoseconds. `None` for calendar spans, whose
    /// length varies.
    pub fn nanoseconds(&self) -> Option<i64> {
        self.unit
            .nanoseconds()
            .map(|ns| i64::from(self.count) * ns)
    }

    /// Length of a calendar span in months.
    pub fn months(&self) -> Option<u32> {
        self.unit
            .months()
            .map(|months| self.count.saturating_mul(months))
    }
}

impl FromStr for Frequency {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigValidationError::InvalidFrequency(s.to_string());
        let caps = FREQUENCY_PATTERN.captures(s).ok_or_else(invalid)?;

        let count = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
            "" => 1,
            digits => digits.parse::<u32>().map_err(|_| invalid())?,
        };
        let unit = caps
            .get(2)
            .and_then(|m| FrequencyUnit::from_alias(m.as_str()))
            .ok_or_else(invalid)?;

        Frequency::new(count, unit).map_err(|_| invalid())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.polars_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== enum parsing tests ====

    #[test]
    fn test_fill_method_from_str() {
        assert_eq!("bfill".parse::<FillMethod>().unwrap(), FillMethod::Backward);
        assert_eq!("FFILL".parse::<FillMethod>().unwrap(), FillMethod::Forward);
        assert_eq!("mean".parse::<FillMethod>().unwrap(), FillMethod::Mean);
        assert!(matches!(
            "median".parse::<FillMethod>(),
            Err(ConfigValidationError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_aggregation_aliases() {
        assert_eq!(
            "variance".parse::<AggregationMethod>().unwrap(),
            AggregationMethod::Var
        );
        assert_eq!(
            "var".parse::<AggregationMethod>().unwrap(),
            AggregationMethod::Var
        );
        assert!("median".parse::<AggregationMethod>().is_err());
    }

    #[test]
    fn test_axis_from_str() {
        assert_eq!("0".parse::<Axis>().unwrap(), Axis::Rows);
        assert_eq!("index".parse::<Axis>().unwrap(), Axis::Rows);
        assert_eq!("columns".parse::<Axis>().unwrap(), Axis::Columns);
        assert!("2".parse::<Axis>().is_err());
    }

    #[test]
    fn test_enum_deserialization() {
        let method: FillMethod = serde_json::from_str(r#""bfill""#).unwrap();
        assert_eq!(method, FillMethod::Backward);

        let agg: AggregationMethod = serde_json::from_str(r#""variance""#).unwrap();
        assert_eq!(agg, AggregationMethod::Var);
    }

    #[test]
    fn test_fill_value_untagged() {
        let value: FillValue = serde_json::from_str("0").unwrap();
        assert_eq!(value, FillValue::Number(0.0));
        let value: FillValue = serde_json::from_str(r#""unknown""#).unwrap();
        assert_eq!(value, FillValue::Text("unknown".to_string()));
        let value: FillValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, FillValue::Bool(true));
    }

    // ==== Frequency tests ====

    #[test]
    fn test_frequency_parse() {
        let freq: Frequency = "2H".parse().unwrap();
        assert_eq!(freq.count(), 2);
        assert_eq!(freq.unit(), FrequencyUnit::Hour);
        assert_eq!(freq.polars_string(), "2h");

        assert_eq!("15min".parse::<Frequency>().unwrap().polars_string(), "15m");
        assert_eq!("T".parse::<Frequency>().unwrap().polars_string(), "1m");
        assert_eq!("500ms".parse::<Frequency>().unwrap().polars_string(), "500ms");
        assert_eq!("3s".parse::<Frequency>().unwrap().polars_string(), "3s");
        assert_eq!("1W".parse::<Frequency>().unwrap().polars_string(), "1w");
    }

    #[test]
    fn test_frequency_nanoseconds() {
        let freq: Frequency = "24H".parse().unwrap();
        assert_eq!(freq.nanoseconds(), Some(86_400_000_000_000));
        assert_eq!("1M".parse::<Frequency>().unwrap().nanoseconds(), None);
    }

    #[test]
    fn test_frequency_calendar_aliases() {
        for (rule, polars, months) in [
            ("M", "1mo", 1),
            ("MS", "1mo", 1),
            ("2ME", "2mo", 2),
            ("Q", "1q", 3),
            ("Y", "1y", 12),
            ("A", "1y", 12),
        ] {
            let freq: Frequency = rule.parse().unwrap();
            assert_eq!(freq.polars_string(), polars, "rule {rule:?}");
            assert_eq!(freq.months(), Some(months), "rule {rule:?}");
        }
        assert_eq!("2H".parse::<Frequency>().unwrap().months(), None);
        // lowercase m is not a minute alias
        assert!("5m".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_rejects_malformed() {
        for rule in ["", "0H", "2X", "H2", "-1D", "2 hours"] {
            assert!(
                matches!(
                    rule.parse::<Frequency>(),
                    Err(ConfigValidationError::InvalidFrequency(_))
                ),
                "rule {rule:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_frequency_to_duration() {
        let freq: Frequency = "4H".parse().unwrap();
        let duration = freq.to_duration();
        assert_eq!(duration.duration_ns(), 4 * 3_600_000_000_000);
    }
}

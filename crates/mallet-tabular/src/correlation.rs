//! Pairwise correlation between numeric columns.
//!
//! Each pair uses only the rows where both columns have a value. A column
//! without variance over those rows correlates as NaN.

use crate::columns::{ColumnTypeMap, SemanticType};
use crate::error::{ConfigValidationError, Result, TabularError};
use crate::utils::{numeric_values, series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Linear (Pearson) correlation.
    #[default]
    Pearson,
    /// Kendall rank correlation (tau-b).
    Kendall,
    /// Spearman rank correlation.
    Spearman,
}

impl CorrelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Kendall => "kendall",
            CorrelationMethod::Spearman => "spearman",
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "kendall" => Ok(CorrelationMethod::Kendall),
            "spearman" => Ok(CorrelationMethod::Spearman),
            _ => Err(ConfigValidationError::UnknownVariant {
                kind: "correlation method",
                value: s.to_string(),
                expected: "pearson, kendall, spearman",
            }),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symmetric correlation matrix over named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub names: Vec<String>,
    /// Row-major, `names.len()` by `names.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Coefficient between two named columns.
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.get(i, j)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Correlate the listed columns.
///
/// Every column must be numeric; anything else is a `TypeMismatch`.
pub fn correlation_matrix(
    df: &DataFrame,
    columns: &[String],
    method: CorrelationMethod,
) -> Result<CorrelationMatrix> {
    let mut data = Vec::with_capacity(columns.len());
    for name in columns {
        let s = series(df, name)?;
        let ty = SemanticType::of(s.dtype());
        if ty != SemanticType::Numeric {
            return Err(TabularError::TypeMismatch {
                column: name.clone(),
                expected: SemanticType::Numeric.tag().to_string(),
                found: ty.tag().to_string(),
            });
        }
        data.push(numeric_values(s)?);
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let (x, y) = complete_pairs(&data[i], &data[j]);
            let r = match method {
                CorrelationMethod::Pearson => pearson(&x, &y),
                CorrelationMethod::Spearman => pearson(&average_ranks(&x), &average_ranks(&y)),
                CorrelationMethod::Kendall => kendall_tau_b(&x, &y),
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        method,
        names: columns.to_vec(),
        values,
    })
}

/// Correlate every numeric column of a frame.
pub fn numeric_correlation(df: &DataFrame, method: CorrelationMethod) -> Result<CorrelationMatrix> {
    let types = ColumnTypeMap::classify(df);
    correlation_matrix(df, types.numeric(), method)
}

fn complete_pairs(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .unzip()
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        (cov / denom).clamp(-1.0, 1.0)
    }
}

/// Ranks starting at 1, ties sharing their average rank.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end (0-based) share ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            match (dx == 0.0, dy == 0.0) {
                (true, true) => {}
                (true, false) => ties_x += 1,
                (false, true) => ties_y += 1,
                (false, false) => {
                    if (dx > 0.0) == (dy > 0.0) {
                        concordant += 1;
                    } else {
                        discordant += 1;
                    }
                }
            }
        }
    }

    let n1 = (concordant + discordant + ties_x) as f64;
    let n2 = (concordant + discordant + ties_y) as f64;
    let denom = (n1 * n2).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        (concordant - discordant) as f64 / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn frame() -> DataFrame {
        df![
            "x" => [1.0, 2.0, 3.0, 4.0, 5.0],
            "y" => [2.0, 4.0, 6.0, 8.0, 10.0],
            "z" => [5.0, 3.0, 4.0, 1.0, 2.0],
            "k" => [7.0, 7.0, 7.0, 7.0, 7.0],
            "t" => ["a", "b", "c", "d", "e"],
        ]
        .unwrap()
    }

    #[test]
    fn test_pearson_perfect() {
        let corr = correlation_matrix(
            &frame(),
            &["x".to_string(), "y".to_string()],
            CorrelationMethod::Pearson,
        )
        .unwrap();
        assert!(approx(corr.between("x", "y").unwrap(), 1.0));
        assert!(approx(corr.get(0, 0).unwrap(), 1.0));
    }

    #[test]
    fn test_spearman_and_kendall() {
        let cols = ["x".to_string(), "z".to_string()];
        let spearman = correlation_matrix(&frame(), &cols, CorrelationMethod::Spearman).unwrap();
        // ranks of z: [5, 3, 4, 1, 2]; d^2 sum = 16+1+1+9+9 = 36
        assert!(approx(spearman.between("x", "z").unwrap(), 1.0 - 6.0 * 36.0 / 120.0));

        let kendall = correlation_matrix(&frame(), &cols, CorrelationMethod::Kendall).unwrap();
        // 2 concordant, 8 discordant pairs
        assert!(approx(kendall.between("x", "z").unwrap(), -0.6));
    }

    #[test]
    fn test_constant_column_is_nan() {
        let corr = correlation_matrix(
            &frame(),
            &["x".to_string(), "k".to_string()],
            CorrelationMethod::Pearson,
        )
        .unwrap();
        assert!(corr.between("x", "k").unwrap().is_nan());
    }

    #[test]
    fn test_text_column_is_type_mismatch() {
        let result = correlation_matrix(
            &frame(),
            &["x".to_string(), "t".to_string()],
            CorrelationMethod::Pearson,
        );
        assert!(matches!(result, Err(TabularError::TypeMismatch { column, .. }) if column == "t"));
    }

    #[test]
    fn test_pairwise_complete_rows() {
        let df = df![
            "a" => [Some(1.0), Some(2.0), None, Some(4.0)],
            "b" => [Some(1.0), Some(2.0), Some(100.0), Some(4.0)],
        ]
        .unwrap();
        let corr = numeric_correlation(&df, CorrelationMethod::Pearson).unwrap();
        assert!(approx(corr.between("a", "b").unwrap(), 1.0));
    }

    #[test]
    fn test_numeric_correlation_uses_numeric_columns() {
        let corr = numeric_correlation(&frame(), CorrelationMethod::Pearson).unwrap();
        assert_eq!(
            corr.names,
            vec!["x".to_string(), "y".to_string(), "z".to_string(), "k".to_string()]
        );
    }

    #[test]
    fn test_average_ranks_ties() {
        assert_eq!(average_ranks(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "Kendall".parse::<CorrelationMethod>().unwrap(),
            CorrelationMethod::Kendall
        );
        assert!("cosine".parse::<CorrelationMethod>().is_err());
    }
}

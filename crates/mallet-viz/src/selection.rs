//! Choosing which columns feed a chart.
//!
//! These helpers pair numeric columns for two-axis charts, order category
//! columns into a treemap path, and decide whether a category column should
//! color points or only label them.

use mallet_tabular::error::Result;
use mallet_tabular::utils::{check_columns, check_numeric, distinct_count};
use mallet_tabular::ColumnTypeMap;
use polars::prelude::*;
use serde::Serialize;
use tracing::warn;

/// Every unordered pair of distinct columns, in input order.
///
/// Returns no pairs when a column is missing or not numeric.
pub fn numeric_pairs(df: &DataFrame, numeric_cols: &[String]) -> Vec<(String, String)> {
    let checked = check_columns(df, numeric_cols).and_then(|_| check_numeric(df, numeric_cols));
    if let Err(e) = checked {
        warn!("Cannot pair columns: {}", e);
        return Vec::new();
    }

    let mut pairs = Vec::new();
    for (i, x) in numeric_cols.iter().enumerate() {
        for y in &numeric_cols[i + 1..] {
            if x != y {
                pairs.push((x.clone(), y.clone()));
            }
        }
    }
    pairs
}

/// Category columns ordered from fewest to most distinct values, truncated
/// to `limit`. Ties keep their column order in the frame.
pub fn hierarchical_path(
    df: &DataFrame,
    types: &ColumnTypeMap,
    limit: usize,
) -> Result<Vec<String>> {
    let mut ranked = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| types.find(name).is_some_and(|ty| ty.is_categorical_like()))
        .map(|name| -> Result<(usize, String)> { Ok((distinct_count(df, &name)?, name)) })
        .collect::<Result<Vec<_>>>()?;
    ranked.sort_by_key(|(count, _)| *count);

    Ok(ranked.into_iter().take(limit).map(|(_, name)| name).collect())
}

/// Category columns split by how they should mark scatter points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameHueSplit {
    /// Too many distinct values to color by; used as hover labels.
    pub name: Vec<String>,
    /// Few enough distinct values to color points by.
    pub hue: Vec<String>,
}

/// Split the category columns on rows per distinct value.
///
/// A column averaging fewer than `threshold` rows per distinct value goes to
/// `name`, anything else to `hue`. Every category column with at least one
/// value lands in exactly one list.
pub fn column_use(
    df: &DataFrame,
    types: &ColumnTypeMap,
    threshold: usize,
) -> Result<NameHueSplit> {
    let rows = df.height() as f64;
    let mut split = NameHueSplit::default();

    for name in types.categorical_set() {
        let distinct = distinct_count(df, &name)?;
        if distinct == 0 {
            continue;
        }
        let ratio = rows / distinct as f64;
        if ratio < threshold as f64 {
            split.name.push(name);
        } else {
            split.hue.push(name);
        }
    }
    Ok(split)
}

/// Columns with at most `maximum` distinct values, nulls counting as one.
///
/// With `categorical_only` only the category columns are considered.
pub fn columns_with_distinct_values(
    df: &DataFrame,
    types: &ColumnTypeMap,
    maximum: usize,
    categorical_only: bool,
) -> Result<Vec<String>> {
    let candidates: Vec<String> = if categorical_only {
        types.categorical_set()
    } else {
        df.get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    };

    let mut selected = Vec::new();
    for name in candidates {
        if distinct_count(df, &name)? <= maximum {
            selected.push(name);
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mixed() -> DataFrame {
        df![
            "A" => [1i64, 2, 3, 4, 5],
            "B" => [2i64, 4, 6, 8, 10],
            "C" => ["dog", "cat", "sheep", "dog", "cat"],
            "D" => ["male", "male", "male", "female", "female"],
            "E" => [true, true, false, true, true],
            "F" => ["chess", "scrabble", "checkers", "card games", "dominoes"],
        ]
        .unwrap()
    }

    fn numeric() -> DataFrame {
        df![
            "A" => [1i64, 2, 3, 4, 5],
            "B" => [2i64, 4, 6, 8, 10],
            "C" => [2i64, 3, 4, 5, 6],
            "D" => [4i64, 7, 2, 5, 7],
        ]
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // ==== numeric_pairs tests ====

    #[test]
    fn test_pairs_every_combination_once() {
        let pairs = numeric_pairs(&numeric(), &names(&["A", "B", "C", "D"]));
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], ("A".to_string(), "B".to_string()));
        assert_eq!(pairs[5], ("C".to_string(), "D".to_string()));
        for (x, y) in &pairs {
            assert_ne!(x, y);
            assert!(!pairs.contains(&(y.clone(), x.clone())));
        }
    }

    #[test]
    fn test_pairs_degenerate_inputs() {
        assert!(numeric_pairs(&mixed(), &names(&["A", "B", "C", "D"])).is_empty());
        assert!(numeric_pairs(&numeric(), &names(&["A", "Q"])).is_empty());
        assert!(numeric_pairs(&numeric(), &names(&["A"])).is_empty());
    }

    // ==== hierarchical_path tests ====

    #[test]
    fn test_path_orders_by_distinct_count() {
        let df = mixed();
        let path = hierarchical_path(&df, &ColumnTypeMap::classify(&df), 3).unwrap();
        assert_eq!(path, names(&["D", "E", "C"]));
        assert_eq!(path.last().map(String::as_str), Some("C"));
    }

    #[test]
    fn test_path_ties_follow_frame_order() {
        let df = df![
            "D" => ["male", "male", "female"],
            "E" => [true, false, true],
        ]
        .unwrap();
        let types = ColumnTypeMap::classify(&df);
        assert_eq!(hierarchical_path(&df, &types, 2).unwrap(), names(&["D", "E"]));

        let df = df![
            "E" => [true, false, true],
            "D" => ["male", "male", "female"],
        ]
        .unwrap();
        let types = ColumnTypeMap::classify(&df);
        assert_eq!(hierarchical_path(&df, &types, 2).unwrap(), names(&["E", "D"]));
    }

    #[test]
    fn test_path_without_categories_is_empty() {
        let df = numeric();
        assert!(hierarchical_path(&df, &ColumnTypeMap::classify(&df), 2).unwrap().is_empty());
    }

    // ==== column_use tests ====

    #[test]
    fn test_column_use_thresholds() {
        let df = mixed();
        let types = ColumnTypeMap::classify(&df);

        let loose = column_use(&df, &types, 5).unwrap();
        assert_eq!(loose.name, names(&["E", "C", "D", "F"]));
        assert!(loose.hue.is_empty());

        let tight = column_use(&df, &types, 2).unwrap();
        assert_eq!(tight.name, names(&["C", "F"]));
        assert_eq!(tight.hue, names(&["E", "D"]));
    }

    #[test]
    fn test_column_use_partition_is_monotone() {
        let df = mixed();
        let types = ColumnTypeMap::classify(&df);
        let mut previous = 0;
        for threshold in 1..8 {
            let split = column_use(&df, &types, threshold).unwrap();
            assert_eq!(split.name.len() + split.hue.len(), 4);
            assert!(split.name.len() >= previous);
            previous = split.name.len();
        }
    }

    // ==== columns_with_distinct_values tests ====

    #[test]
    fn test_distinct_value_limit() {
        let df = mixed();
        let types = ColumnTypeMap::classify(&df);

        let all = columns_with_distinct_values(&df, &types, 3, false).unwrap();
        assert_eq!(all, names(&["C", "D", "E"]));

        let df = numeric();
        let types = ColumnTypeMap::classify(&df);
        let wide = columns_with_distinct_values(&df, &types, 5, false).unwrap();
        assert_eq!(wide.len(), 4);
        let categorical = columns_with_distinct_values(&df, &types, 5, true).unwrap();
        assert!(categorical.is_empty());
    }
}

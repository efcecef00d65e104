//! Dropping, renaming and selecting columns.

use super::{Transformer, column_list, column_name};
use crate::error::{ConfigValidationError, Result};
use crate::table::Table;
use crate::utils::check_columns;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Removes the listed columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDropper {
    columns: Vec<String>,
}

impl ColumnDropper {
    pub fn new<I, S>(columns: I) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            columns: column_list(columns, "columns")?,
        })
    }
}

impl Transformer for ColumnDropper {
    fn name(&self) -> &'static str {
        "ColumnDropper"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        check_columns(table.frame(), &self.columns)?;
        let names: Vec<PlSmallStr> = self.columns.iter().map(|s| s.as_str().into()).collect();
        let frame = table.frame().drop_many(names);
        Ok(table.replace_frame(frame))
    }
}

/// Renames columns from old to new names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRename {
    mapping: Vec<(String, String)>,
}

impl ColumnRename {
    pub fn new<I, S, T>(mapping: I) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mapping = mapping
            .into_iter()
            .map(|(old, new)| -> std::result::Result<_, ConfigValidationError> {
                Ok((column_name(old, "mapping")?, column_name(new, "mapping")?))
            })
            .collect::<std::result::Result<Vec<(String, String)>, ConfigValidationError>>()?;
        if mapping.is_empty() {
            return Err(ConfigValidationError::Empty { field: "mapping" });
        }
        Ok(Self { mapping })
    }
}

impl Transformer for ColumnRename {
    fn name(&self) -> &'static str {
        "ColumnRename"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let old: Vec<String> = self.mapping.iter().map(|(old, _)| old.clone()).collect();
        check_columns(table.frame(), &old)?;

        let mut frame = table.frame().clone();
        for (old, new) in &self.mapping {
            frame.rename(old, new.as_str().into())?;
        }
        Ok(table.replace_frame(frame))
    }
}

/// Keeps only the listed columns, in the listed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSelector {
    columns: Vec<String>,
}

impl ColumnSelector {
    pub fn new<I, S>(columns: I) -> std::result::Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            columns: column_list(columns, "columns")?,
        })
    }
}

impl Transformer for ColumnSelector {
    fn name(&self) -> &'static str {
        "ColumnSelector"
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        check_columns(table.frame(), &self.columns)?;
        let frame = table.frame().select(self.columns.iter().map(String::as_str))?;
        Ok(table.replace_frame(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn df() -> DataFrame {
        df![
            "A" => [1i64, 2, 3, 4, 5],
            "B" => [2i64, 4, 6, 8, 10],
            "C" => ["dog", "cat", "sheep", "dog", "cat"],
            "D" => ["male", "male", "male", "female", "female"],
            "E" => [true, true, false, true, true],
        ]
        .unwrap()
    }

    #[test]
    fn test_dropper() {
        let out = ColumnDropper::new(["C", "D", "E"])
            .unwrap()
            .transform(&Table::new(df()));
        assert_eq!(out.column_names(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_dropper_unknown_column_is_noop() {
        let out = ColumnDropper::new(["C", "Q"])
            .unwrap()
            .transform(&Table::new(df()));
        assert_eq!(out.width(), 5);
    }

    #[test]
    fn test_rename() {
        let out = ColumnRename::new([("A", "V"), ("B", "W")])
            .unwrap()
            .transform(&Table::new(df()));
        assert_eq!(
            out.column_names(),
            vec!["V", "W", "C", "D", "E"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_rename_rejects_empty_mapping() {
        assert!(ColumnRename::new(Vec::<(String, String)>::new()).is_err());
        assert!(ColumnRename::new([("A", "")]).is_err());
    }

    #[test]
    fn test_selector_reorders() {
        let out = ColumnSelector::new(["E", "A"])
            .unwrap()
            .transform(&Table::new(df()));
        assert_eq!(out.column_names(), vec!["E".to_string(), "A".to_string()]);
    }
}

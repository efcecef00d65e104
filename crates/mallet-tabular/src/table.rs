//! The table type every transformer consumes and produces.
//!
//! Polars frames have no row index, so [`Table`] pairs a `DataFrame` with an
//! optional index `Series` aligned by position. A datetime index is what the
//! time-series transformers key on.

use crate::error::{Result, TabularError};
use polars::prelude::*;

/// A data frame with an optional row index.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    index: Option<Series>,
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Wrap a frame without a row index.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame, index: None }
    }

    /// Wrap a frame with an explicit row index.
    pub fn with_index(frame: DataFrame, index: Series) -> Result<Self> {
        if index.len() != frame.height() {
            return Err(TabularError::IndexLengthMismatch {
                expected: frame.height(),
                actual: index.len(),
            });
        }
        Ok(Self {
            frame,
            index: Some(index),
        })
    }

    /// Move an existing column into the row index.
    pub fn set_index(frame: DataFrame, column: &str) -> Result<Self> {
        let index = frame
            .column(column)
            .map_err(|_| TabularError::ColumnNotFound(column.to_string()))?
            .as_materialized_series()
            .clone();
        let frame = frame.drop(column)?;
        Ok(Self {
            frame,
            index: Some(index),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn index(&self) -> Option<&Series> {
        self.index.as_ref()
    }

    /// Split into the frame and the index.
    pub fn into_parts(self) -> (DataFrame, Option<Series>) {
        (self.frame, self.index)
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Replace the frame, keeping the index.
    ///
    /// The caller guarantees the new frame has the same height; transformers
    /// that change the row count build a new table instead.
    pub(crate) fn replace_frame(&self, frame: DataFrame) -> Self {
        Self {
            frame,
            index: self.index.clone(),
        }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Check whether the row index holds timestamps.
    pub fn is_time_indexed(&self) -> bool {
        self.index
            .as_ref()
            .is_some_and(|index| is_time_like(index.dtype()))
    }
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}

/// Check if a DataType can key a time window.
#[inline]
pub fn is_time_like(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check whether a table carries a time-like row index.
pub fn time_index(table: &Table) -> bool {
    table.is_time_indexed()
}

//! Error types for chart selection and report generation.
//!
//! Unmet data prerequisites are not errors here: a builder that finds nothing
//! to draw returns an empty list. [`VizError`] is reserved for bad
//! configuration and for failures inside Polars, serialization or file I/O.

use mallet_tabular::{ConfigValidationError, TabularError};
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VizError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Failure in the tabular layer.
    #[error(transparent)]
    Tabular(#[from] TabularError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be read or written as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A chart could not be rendered.
    #[error("Render error: {0}")]
    Render(String),
}

impl VizError {
    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Tabular(err) => err.error_code(),
            Self::Polars(_) => "POLARS_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Render(_) => "RENDER_ERROR",
        }
    }
}

impl Serialize for VizError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("VizError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, VizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through_tabular() {
        let err: VizError = TabularError::ColumnNotFound("A".into()).into();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert_eq!(err.to_string(), "Column 'A' not found in table");
    }

    #[test]
    fn test_serializes_code_and_message() {
        let err = VizError::InvalidConfig(ConfigValidationError::Empty { field: "filename" });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INVALID_CONFIG");
        assert!(json["message"].as_str().unwrap().contains("filename"));
    }
}

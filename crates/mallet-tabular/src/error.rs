//! Error types for table classification and column transformers.
//!
//! Two kinds of failure are kept apart:
//!
//! - [`ConfigValidationError`] is raised when a transformer is constructed with
//!   malformed arguments. It always surfaces to the caller.
//! - [`TabularError`] covers data-time failures. The precondition subset
//!   (missing columns, non-numeric columns, missing time index) is what
//!   [`Transformer::transform`](crate::Transformer::transform) swallows when it
//!   fails closed.
//!
//! Errors are serializable as `{code, message}` so they can be reported by
//! front ends without matching on variants.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for tabular operations.
#[derive(Error, Debug)]
pub enum TabularError {
    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Arithmetic was requested on a column that is not numeric.
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    /// A column has a different semantic type than the operation requires.
    #[error("Column '{column}' has type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The operation needs a datetime row index and the table has none.
    #[error("Table does not carry a time-like row index")]
    MissingTimeIndex,

    /// The row index length differs from the table height.
    #[error("Index has {actual} rows but the table has {expected}")]
    IndexLengthMismatch { expected: usize, actual: usize },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TabularError>,
    },
}

impl TabularError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TabularError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NotNumeric(_) => "NOT_NUMERIC",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::MissingTimeIndex => "MISSING_TIME_INDEX",
            Self::IndexLengthMismatch { .. } => "INDEX_LENGTH_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is an unmet data precondition rather than a failure.
    ///
    /// These are the errors a permissive transform turns into a no-op.
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::NotNumeric(_)
            | Self::TypeMismatch { .. }
            | Self::MissingTimeIndex => true,
            Self::WithContext { source, .. } => source.is_precondition(),
            _ => false,
        }
    }
}

impl Serialize for TabularError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TabularError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Errors raised while validating transformer arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{field}' must not be empty")]
    Empty { field: &'static str },

    #[error("Unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    OutOfRange {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid frequency rule '{0}'")]
    InvalidFrequency(String),
}

/// Result type alias for tabular operations.
pub type Result<T> = std::result::Result<T, TabularError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TabularError::Polars(e).with_context(context))
    }
}

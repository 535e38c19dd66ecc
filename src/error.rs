//! Error type shared by the cleaning, training, scoring and evaluation stages.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by pipeline stages.
///
/// Every stage either returns a complete result or one of these; nothing is
/// retried and no partial output is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A column the stage depends on is absent from the table.
    #[error("Column not found: {column}")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
    /// A model was asked to score with a feature list it was not fitted on.
    #[error("Feature list does not match the model: expected {expected:?}, got {actual:?}")]
    FeatureMismatch {
        /// Features the model was fitted on.
        expected: Vec<String>,
        /// Features supplied by the caller.
        actual: Vec<String>,
    },
    /// A cell held the wrong kind of value for the stage.
    #[error("Column {column} has unexpected value {value:?}: {expected}")]
    Type {
        /// Column holding the offending cell.
        column: String,
        /// Rendered offending value.
        value: String,
        /// What the stage expected.
        expected: &'static str,
    },
    /// Out-of-range parameter or degenerate input.
    #[error("{0}")]
    Value(String),
    /// The model carries no fitted parameters.
    #[error("Model has not been fitted")]
    NotFitted,
    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// CSV parse failure.
    #[error("CSV error at {path}: {source}")]
    Csv {
        /// CSV file path.
        path: PathBuf,
        /// Underlying reader error.
        source: PolarsError,
    },
    /// A data frame operation failed outside of file IO.
    #[error("Data frame error: {0}")]
    Frame(#[from] PolarsError),
    /// Model or metrics document could not be (de)serialized.
    #[error("JSON error at {path}: {source}")]
    Json {
        /// Document path.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub(crate) fn missing(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub(crate) fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    /// True for lookup failures (missing column or mismatched feature list).
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::FeatureMismatch { .. }
        )
    }
}

/// Result alias used by pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;

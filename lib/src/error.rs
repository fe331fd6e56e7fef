//! Error types for pipeline orchestration and the pieces it runs.

use crate::dataset::ColumnType;
use thiserror::Error;

/// Error type for every fallible operation in the crate.
///
/// Normalization errors are raised before any piece runs. Everything else is
/// raised by a piece while it runs (or by persistence helpers) and reaches the
/// caller unchanged: the orchestrator never wraps or retries a failure.
#[derive(Debug, Error)]
pub enum MungeError {
    /// A spec argument could not be resolved into a piece.
    #[error("Cannot normalize argument {position}: {reason}")]
    Normalization { position: usize, reason: String },

    /// A column named by a piece does not exist.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column with this name already exists where a new one was expected.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// A column holds a different type than the piece expected.
    #[error("Column type mismatch: column {name}, expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        name: String,
        expected: ColumnType,
        found: ColumnType,
    },

    /// A column's row count does not match the dataset.
    #[error("Length mismatch: expected {expected} rows, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Training input contains missing (NaN) values.
    #[error("Missing values: {0}")]
    MissingValues(String),

    /// Training input has no rows to learn from.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A predict procedure asked for a parameter that was never learned.
    #[error("Learned state missing: {0}")]
    MissingState(String),

    /// A procedure tried to learn a parameter while replaying.
    #[error("Cannot learn '{0}' in predict mode")]
    StateFrozen(String),

    /// Free-form failure raised by a user procedure.
    #[error("Procedure failed: {0}")]
    Procedure(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(String),

    /// Persisted parameters do not line up with the pieces they restore.
    #[error("Parameter mismatch: expected {expected} pieces, got {got}")]
    ParamsMismatch { expected: usize, got: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MungeError>;

impl From<std::io::Error> for MungeError {
    fn from(err: std::io::Error) -> Self {
        MungeError::Io(err.to_string())
    }
}

impl From<bincode::Error> for MungeError {
    fn from(err: bincode::Error) -> Self {
        MungeError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for MungeError {
    fn from(err: serde_json::Error) -> Self {
        MungeError::Serialization(err.to_string())
    }
}

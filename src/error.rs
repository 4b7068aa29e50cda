use thiserror::Error;

/// Error type for sqlbulk operations
#[derive(Debug, Error)]
pub enum SqlBulkError {
    #[error("Statement has {actual} placeholder(s), expected {expected}")]
    PlaceholderMismatch { expected: usize, actual: usize },

    #[error("More than one bulk parameter group in a single statement")]
    AmbiguousBulkShape,

    #[error("Backend allows {max_variables} variable(s) per statement, but one chunk needs at least {required}")]
    ChunkCapacity {
        max_variables: usize,
        required: usize,
    },

    #[error("Row produced {actual} parameter(s), expected {expected}")]
    RowArity { expected: usize, actual: usize },

    #[error("Count column holds a non-integer value: {0}")]
    InvalidCount(String),

    #[error("Target version {0} cannot be reached")]
    UnreachableVersion(u32),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

/// Result type alias for sqlbulk operations
pub type Result<T> = std::result::Result<T, SqlBulkError>;

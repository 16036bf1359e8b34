use thiserror::Error;

/// Main error type for lexis operations
#[derive(Error, Debug)]
pub enum LexisError {
    #[error("Index build failed: {reason}")]
    IndexBuild { reason: String },

    #[error("Query parse error: {0}")]
    QueryParse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Snapshot error: incompatible version {actual}, expected <= {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for lexis operations
pub type Result<T> = std::result::Result<T, LexisError>;

impl LexisError {
    /// Shorthand for an index build failure
    pub fn index_build(reason: impl Into<String>) -> Self {
        LexisError::IndexBuild {
            reason: reason.into(),
        }
    }

    /// Whether the caller can fix this by changing the query and retrying
    /// against the same index
    pub fn is_query_error(&self) -> bool {
        matches!(self, LexisError::QueryParse(_) | LexisError::InvalidRequest(_))
    }
}

//! Error types for the vector database

use thiserror::Error;

/// Result type alias for vecdb operations
pub type Result<T> = std::result::Result<T, VectorDbError>;

/// Error types that can occur in vecdb operations
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate id: {id}")]
    DuplicateId { id: String },

    #[error("Unknown id: {id}")]
    UnknownId { id: String },

    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid filter operator: {0}")]
    InvalidFilterOperator(String),

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Persisted {what} mismatch: expected {expected}, found {found}")]
    PersistenceVersionMismatch {
        what: &'static str,
        expected: u64,
        found: u64,
    },

    #[error("Corrupt persisted state: {0}")]
    CorruptPersistedState(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Batch element {index} rejected: {source}")]
    BatchFailed {
        index: usize,
        #[source]
        source: Box<VectorDbError>,
    },
}

impl VectorDbError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        VectorDbError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        VectorDbError::CorruptPersistedState(reason.into())
    }
}

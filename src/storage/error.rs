/// Error types for storage operations

use thiserror::Error;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Vertex not found
    #[error("Vertex not found: {0}")]
    VertexNotFound(String),

    /// A unique indexed property value is already taken
    #[error("Unique constraint violated: {label}.{property} = '{value}'")]
    UniqueViolation {
        label: String,
        property: String,
        value: String,
    },

    /// Counter overflow
    #[error("Counter overflow for label: {0}")]
    CounterOverflow(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// RocksDB error
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),

    /// Corrupt or unexpected on-disk state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// UTF-8 conversion error
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

//! Error types for store operations
//!
//! The consistency messages are observable by scripts and are kept stable.

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Read of a node that holds no scalar value
    #[error("Database value does not exist")]
    ValueNotFound,

    /// Scalar assignment to a node that has children
    #[error("Can't override value with composite")]
    OverrideComposite,

    /// Traversal through, or enumeration of, a scalar node
    #[error("Inconsistent database: parent is not a composite")]
    ParentNotComposite,

    /// Text handed to `from_json` is not a document
    #[error("Invalid document JSON: {0}")]
    InvalidJson(String),

    /// Snapshot file could not be read or written
    #[error("Snapshot I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidJson(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

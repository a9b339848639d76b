//! Storage layer error types.

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Collection namespace not available
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Object key not present in the collection
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Key is not valid UTF-8 or otherwise malformed
    #[error("Key error: {0}")]
    Key(String),

    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

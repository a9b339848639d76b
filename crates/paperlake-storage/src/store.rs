//! Object store contract.
//!
//! Defines the interface the orchestrators depend on. Implementations must
//! auto-provision their namespaces; concurrent provisioning must not fail
//! the caller.

use async_trait::async_trait;

use crate::error::StorageError;

/// The two storage layers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Raw ingested envelopes, append-only.
    Bronze,
    /// Processed articles, one per fully processed bronze item.
    Silver,
}

impl Collection {
    /// Stable namespace name used by persistent backends.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Bronze => "bronze",
            Collection::Silver => "silver",
        }
    }

    /// All collections, in provisioning order.
    pub fn all() -> [Collection; 2] {
        [Collection::Bronze, Collection::Silver]
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Namespaced blob store over the bronze and silver collections.
///
/// Writes are keyed by record id and idempotent to race: two callers
/// putting the same key produce one object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object, replacing any existing object under the key.
    async fn put(&self, collection: Collection, key: &str, bytes: &[u8])
        -> Result<(), StorageError>;

    /// Fetch an object. Returns `StorageError::NotFound` for absent keys.
    async fn get(&self, collection: Collection, key: &str) -> Result<Vec<u8>, StorageError>;

    /// List all keys in a collection.
    async fn list(&self, collection: Collection) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists without fetching the object.
    async fn exists(&self, collection: Collection, key: &str) -> Result<bool, StorageError>;
}

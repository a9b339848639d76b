//! In-memory object store.
//!
//! Backs tests and ephemeral runs. Shares the contract of the persistent
//! backend, including race-safe keyed puts.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::store::{Collection, ObjectStore};

/// Object store holding everything in process memory.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(Collection, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        self.objects
            .read()
            .expect("store lock poisoned")
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        collection: Collection,
        key: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        self.objects
            .write()
            .expect("store lock poisoned")
            .insert((collection, key.to_string()), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .expect("store lock poisoned")
            .get(&(collection, key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", collection, key)))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects
            .read()
            .expect("store lock poisoned")
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, k)| k.clone())
            .collect())
    }

    async fn exists(&self, collection: Collection, key: &str) -> Result<bool, StorageError> {
        Ok(self
            .objects
            .read()
            .expect("store lock poisoned")
            .contains_key(&(collection, key.to_string())))
    }
}

//! RocksDB-backed object store.
//!
//! Each collection maps to a column family. Column families are created at
//! open when missing, so namespace provisioning never fails a caller that
//! races another opener of the same database.

use std::path::Path;

use async_trait::async_trait;
use rocksdb::{IteratorMode, Options, DB};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::store::{Collection, ObjectStore};

/// Persistent object store over a local RocksDB database.
pub struct RocksObjectStore {
    db: DB,
}

impl RocksObjectStore {
    /// Open the store at the given path, creating the database and both
    /// collection namespaces if necessary.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening object store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        // Universal compaction suits the append-only write pattern
        db_opts.set_compaction_style(rocksdb::DBCompactionStyle::Universal);

        let cf_names: Vec<&str> = Collection::all().iter().map(|c| c.name()).collect();
        let db = DB::open_cf(&db_opts, path, cf_names)?;

        Ok(Self { db })
    }

    fn cf_handle(&self, collection: Collection) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(collection.name())
            .ok_or_else(|| StorageError::CollectionNotFound(collection.name().to_string()))
    }
}

#[async_trait]
impl ObjectStore for RocksObjectStore {
    async fn put(
        &self,
        collection: Collection,
        key: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        let cf = self.cf_handle(collection)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        debug!(collection = %collection, key = key, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Vec<u8>, StorageError> {
        let cf = self.cf_handle(collection)?;
        self.db
            .get_cf(cf, key.as_bytes())?
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", collection, key)))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<String>, StorageError> {
        let cf = self.cf_handle(collection)?;
        let mut keys = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            let key = String::from_utf8(key.to_vec())
                .map_err(|e| StorageError::Key(format!("non-utf8 key: {}", e)))?;
            keys.push(key);
        }
        Ok(keys)
    }

    async fn exists(&self, collection: Collection, key: &str) -> Result<bool, StorageError> {
        let cf = self.cf_handle(collection)?;
        Ok(self.db.get_pinned_cf(cf, key.as_bytes())?.is_some())
    }
}

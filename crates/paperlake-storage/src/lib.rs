//! # paperlake-storage
//!
//! Object storage for the medallion layers.
//!
//! The pipeline talks to storage exclusively through the [`ObjectStore`]
//! trait over two collections: bronze (raw envelopes, append-only) and
//! silver (processed articles, create-once). Two backends are provided:
//! - [`RocksObjectStore`]: persistent, one column family per collection
//! - [`MemoryObjectStore`]: in-memory, for tests and ephemeral runs

pub mod error;
pub mod memory;
pub mod rocks;
pub mod store;

pub use error::StorageError;
pub use memory::MemoryObjectStore;
pub use rocks::RocksObjectStore;
pub use store::{Collection, ObjectStore};

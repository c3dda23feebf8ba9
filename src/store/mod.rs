//! Persistent collection boundary.
//!
//! The document store is a capability, not an engine: three narrow traits
//! cover everything the pipeline needs (point reads, idempotent key-value
//! writes, per-document partial patches, full loads). Backends are
//! swappable; SQLite in production, HashMaps in tests.

pub mod memory;
pub mod sqlite;

use crate::catalog::CatalogEntry;
use crate::order::{OrderLine, OrderPatch};
use crate::translate::TranslationRecord;

#[derive(Debug)]
pub enum StoreError {
    Backend(String),
    NotFound(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
            StoreError::NotFound(id) => write!(f, "no document with id {id}"),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Key-value collection of resolved name records, keyed by normalized name.
pub trait TranslationCollection: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<TranslationRecord>, StoreError>;

    /// Idempotent overwrite; racing writers resolve last-write-wins.
    fn put(&self, key: &str, record: &TranslationRecord) -> Result<(), StoreError>;
}

/// The order-line collection: create, patch-by-id, load-all. The core never
/// deletes lines; it only archives them via patch.
pub trait OrderCollection: Send + Sync {
    fn append(&self, line: &OrderLine) -> Result<(), StoreError>;

    fn patch(&self, id: &str, patch: &OrderPatch) -> Result<(), StoreError>;

    /// All lines, newest first by creation.
    fn load_all(&self) -> Result<Vec<OrderLine>, StoreError>;
}

/// The quick-pick catalog collection. Entries are inserted and deleted,
/// never mutated in place.
pub trait CatalogCollection: Send + Sync {
    fn insert(&self, entry: &CatalogEntry) -> Result<(), StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}

/// Current time as Unix timestamp (seconds).
pub(crate) fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

//! Read-through/write-through gateway over the persistent translation
//! collection, with the in-memory LRU in front.
//!
//! The gateway never fails its caller: read errors degrade to a miss and
//! write errors are logged and dropped. Caching is a performance
//! optimization here, not a correctness dependency, so the user-facing flow
//! must behave as if nothing was cached whenever the collection misbehaves.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::TranslationCollection;

use super::cache::MemCache;
use super::TranslationRecord;

pub struct CacheGateway {
    mem: MemCache,
    persistent: Arc<dyn TranslationCollection>,
}

impl CacheGateway {
    pub fn new(capacity: usize, persistent: Arc<dyn TranslationCollection>) -> Self {
        Self {
            mem: MemCache::new(capacity),
            persistent,
        }
    }

    /// Point lookup by normalized name key. A persistent read failure
    /// behaves as a miss.
    pub fn lookup(&self, key: &str) -> Option<TranslationRecord> {
        if let Some(record) = self.mem.get(key) {
            return Some(record);
        }
        match self.persistent.get(key) {
            Ok(Some(record)) => {
                self.mem.insert(key.to_string(), record.clone());
                debug!(key, "persistent cache hit");
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Idempotent overwrite through both layers. Two submissions racing on
    /// the same key both keep their local record; the last writer wins in
    /// the collection. Persistent failure is logged and non-fatal.
    pub fn store(&self, key: &str, record: &TranslationRecord) {
        self.mem.insert(key.to_string(), record.clone());
        if let Err(e) = self.persistent.put(key, record) {
            warn!(key, error = %e, "cache write failed (non-fatal)");
        }
    }
}

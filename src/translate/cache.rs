//! In-memory layer of the translation cache.
//! Keyed by normalized product name. Records are immutable once resolved,
//! so entries carry no TTL; LRU eviction only bounds memory.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use super::TranslationRecord;

pub struct MemCache {
    inner: Mutex<LruCache<String, TranslationRecord>>,
}

impl MemCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("cache capacity must be > 0"),
            )),
        }
    }

    /// Look up a cached record. Refreshes LRU position on hit.
    pub fn get(&self, key: &str) -> Option<TranslationRecord> {
        self.inner.lock().get(key).cloned()
    }

    /// Insert a record, evicting the least recently used entry when full.
    pub fn insert(&self, key: String, record: TranslationRecord) {
        self.inner.lock().put(key, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_what_was_inserted() {
        let cache = MemCache::new(4);
        cache.insert("domates".into(), TranslationRecord::identity("Domates"));
        assert_eq!(
            cache.get("domates"),
            Some(TranslationRecord::identity("Domates"))
        );
        assert_eq!(cache.get("biber"), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = MemCache::new(2);
        cache.insert("a".into(), TranslationRecord::identity("a"));
        cache.insert("b".into(), TranslationRecord::identity("b"));
        cache.insert("c".into(), TranslationRecord::identity("c"));
        assert_eq!(cache.get("a"), None);
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }
}

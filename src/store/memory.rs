//! HashMap-backed collections for tests and ephemeral runs.
//! One struct implements all three collection traits, mirroring how a
//! single database backs every collection in production.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::catalog::CatalogEntry;
use crate::order::{OrderLine, OrderPatch};
use crate::translate::TranslationRecord;

use super::{
    now_unix, CatalogCollection, OrderCollection, StoreError, TranslationCollection,
};

#[derive(Default)]
pub struct MemoryStore {
    translations: RwLock<HashMap<String, TranslationRecord>>,
    orders: RwLock<Vec<OrderLine>>,
    catalog: RwLock<Vec<CatalogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranslationCollection for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<TranslationRecord>, StoreError> {
        Ok(self.translations.read().get(key).cloned())
    }

    fn put(&self, key: &str, record: &TranslationRecord) -> Result<(), StoreError> {
        self.translations
            .write()
            .insert(key.to_string(), record.clone());
        Ok(())
    }
}

impl OrderCollection for MemoryStore {
    fn append(&self, line: &OrderLine) -> Result<(), StoreError> {
        self.orders.write().push(line.clone());
        Ok(())
    }

    fn patch(&self, id: &str, patch: &OrderPatch) -> Result<(), StoreError> {
        let mut orders = self.orders.write();
        let line = orders
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(names) = &patch.names {
            line.names = Some(names.clone());
            line.pending = false;
        }
        if let Some(bought) = patch.bought {
            line.bought = bought;
            line.bought_at = bought.then(now_unix);
        }
        if let Some(archived) = patch.archived {
            line.archived = archived;
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<OrderLine>, StoreError> {
        // Appends arrive in creation order; reversing gives newest first.
        Ok(self.orders.read().iter().rev().cloned().collect())
    }
}

impl CatalogCollection for MemoryStore {
    fn insert(&self, entry: &CatalogEntry) -> Result<(), StoreError> {
        self.catalog.write().push(entry.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.catalog.write().retain(|e| e.id != id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.catalog.read().clone())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.catalog.read().len())
    }
}

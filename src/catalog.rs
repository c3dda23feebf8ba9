//! Curated quick-pick catalog: category listing, one-shot default seeding,
//! opt-in save-back of resolved submissions, unconditional delete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::order::{Category, Supplier};
use crate::store::{now_unix, CatalogCollection, StoreError};
use crate::translate::TranslationRecord;

/// A saved quick-pick template. Created, optionally deleted, never mutated
/// in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub category: Category,
    pub names: TranslationRecord,
    pub default_cost: f64,
    pub default_supplier: Supplier,
    pub created_at: i64,
}

impl CatalogEntry {
    pub fn new(
        category: Category,
        names: TranslationRecord,
        default_cost: f64,
        default_supplier: Supplier,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category,
            names,
            default_cost,
            default_supplier,
            created_at: now_unix(),
        }
    }
}

pub struct CatalogReconciler {
    collection: Arc<dyn CatalogCollection>,
}

impl CatalogReconciler {
    pub fn new(collection: Arc<dyn CatalogCollection>) -> Self {
        Self { collection }
    }

    /// Entries for one category, sorted by their Turkish name for a
    /// reproducible order.
    pub fn list_by_category(&self, category: Category) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut entries: Vec<CatalogEntry> = self
            .collection
            .list()?
            .into_iter()
            .filter(|e| e.category == category)
            .collect();
        entries.sort_by(|a, b| a.names.tr.cmp(&b.names.tr));
        Ok(entries)
    }

    /// Insert the default quick picks when the catalog holds nothing at
    /// all; a no-op the moment any entry exists.
    ///
    /// A catalog emptied entry-by-entry reaches count zero and reseeds on
    /// the next startup, exactly like a brand-new one.
    pub fn seed_if_empty(&self) -> Result<(), StoreError> {
        if self.collection.count()? > 0 {
            return Ok(());
        }
        let defaults = default_entries();
        info!(count = defaults.len(), "seeding empty catalog with defaults");
        for entry in &defaults {
            self.collection.insert(entry)?;
        }
        Ok(())
    }

    /// Save a freshly resolved submission as a reusable quick pick. Only
    /// called once resolution has completed, so cataloged names are always
    /// fully translated.
    pub fn save_selection_as_entry(
        &self,
        names: TranslationRecord,
        category: Category,
        default_cost: f64,
        default_supplier: Supplier,
    ) -> Result<String, StoreError> {
        let entry = CatalogEntry::new(category, names, default_cost, default_supplier);
        let id = entry.id.clone();
        self.collection.insert(&entry)?;
        Ok(id)
    }

    /// Remove an entry for good.
    pub fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        self.collection.delete(id)
    }
}

/// Fixed starter set shown on first run.
fn default_entries() -> Vec<CatalogEntry> {
    fn names(tr: &str, de: &str, pa: &str) -> TranslationRecord {
        TranslationRecord {
            tr: tr.into(),
            de: de.into(),
            pa: pa.into(),
        }
    }

    vec![
        CatalogEntry::new(Category::Veg, names("Domates", "Tomaten", "Tamatar"), 0.0, Supplier::Hal),
        CatalogEntry::new(Category::Veg, names("Soğan", "Zwiebeln", "Pyaaz"), 0.0, Supplier::Hal),
        CatalogEntry::new(Category::Veg, names("Patates", "Kartoffeln", "Aloo"), 0.0, Supplier::Hal),
        CatalogEntry::new(Category::Meat, names("Tavuk", "Hähnchen", "Murgi"), 0.0, Supplier::Kasap),
        CatalogEntry::new(Category::Meat, names("Kıyma", "Hackfleisch", "Keema"), 0.0, Supplier::Kasap),
        CatalogEntry::new(Category::Drink, names("Süt", "Milch", "Dudh"), 0.0, Supplier::Metro),
        CatalogEntry::new(Category::Drink, names("Ayran", "Ayran", "Lassi"), 0.0, Supplier::Metro),
        CatalogEntry::new(Category::Metro, names("Un", "Mehl", "Aata"), 0.0, Supplier::Metro),
        CatalogEntry::new(Category::Metro, names("Ayçiçek Yağı", "Sonnenblumenöl", "Surajmukhi Tel"), 0.0, Supplier::Metro),
        CatalogEntry::new(Category::Other, names("Peçete", "Servietten", "Napkin"), 0.0, Supplier::Other),
    ]
}

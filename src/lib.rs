//! Pastillo: shared kitchen-supply ordering list core.
//! Staff add items in their own language; the pipeline resolves a canonical
//! three-language name, keeps a live order list, and batches pending items
//! into per-supplier dispatch messages.

pub mod catalog;
pub mod order;
pub mod store;
pub mod submit;
pub mod translate;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use catalog::CatalogReconciler;
use order::store::OrderListStore;
use store::sqlite::SqliteStore;
use store::{CatalogCollection, OrderCollection, StoreError, TranslationCollection};
use submit::OrderService;
use translate::gateway::CacheGateway;
use translate::gemini::GeminiClient;
use translate::resolver::TranslationResolver;
use translate::Translator;

/// Entries kept in the in-memory cache layer in front of the persistent
/// translation collection.
const MEM_CACHE_CAPACITY: usize = 512;

/// Shared pipeline wiring handed to the UI layer.
pub struct KitchenContext {
    pub orders: Arc<OrderListStore>,
    pub catalog: Arc<CatalogReconciler>,
    pub resolver: Arc<TranslationResolver>,
    pub service: OrderService,
}

/// Initialize tracing with an env-filterable subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pastillo=debug".parse().unwrap()),
        )
        .with_target(true)
        .init();
}

/// Build the full pipeline on a SQLite database. Must run inside a tokio
/// runtime.
///
/// A missing `GEMINI_API_KEY` disables real translation rather than failing
/// startup; submissions then resolve to identity names and stay fully
/// usable.
pub fn bootstrap(db_path: &Path) -> Result<KitchenContext, StoreError> {
    let sqlite = Arc::new(SqliteStore::open(db_path)?);
    build_context(
        sqlite.clone(),
        sqlite.clone(),
        sqlite,
        translator_from_env(),
    )
}

fn translator_from_env() -> Option<Arc<dyn Translator>> {
    match GeminiClient::new() {
        Ok(client) => {
            info!("gemini translation client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "translation client init failed (API key missing?), translation disabled");
            None
        }
    }
}

/// Wire the pipeline over explicit collection implementations.
pub fn build_context(
    translations: Arc<dyn TranslationCollection>,
    orders: Arc<dyn OrderCollection>,
    catalog_collection: Arc<dyn CatalogCollection>,
    translator: Option<Arc<dyn Translator>>,
) -> Result<KitchenContext, StoreError> {
    let gateway = Arc::new(CacheGateway::new(MEM_CACHE_CAPACITY, translations));
    let resolver = Arc::new(TranslationResolver::new(gateway, translator));
    let orders = Arc::new(OrderListStore::new(orders)?);
    let catalog = Arc::new(CatalogReconciler::new(catalog_collection));

    // One-shot guarded seeding, keyed off the collection size at startup.
    if let Err(e) = catalog.seed_if_empty() {
        warn!(error = %e, "catalog seeding failed, starting with an empty catalog");
    }

    let service = OrderService::start(
        Arc::clone(&resolver),
        Arc::clone(&orders),
        Arc::clone(&catalog),
    );

    Ok(KitchenContext {
        orders,
        catalog,
        resolver,
        service,
    })
}

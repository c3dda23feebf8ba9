//! Submission pipeline: create the line in pending state, resolve the name
//! in the background, patch the line (and optionally the catalog) when the
//! resolution message comes back.
//!
//! Resolution is fire-and-forget: each spawned task runs to completion or
//! failure and reports back over a channel; a single updater loop owns all
//! post-resolution writes. Across lines no completion order is guaranteed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::CatalogReconciler;
use crate::order::store::OrderListStore;
use crate::order::{Category, OrderLine, OrderPatch, Requester, Supplier, Unit};
use crate::store::StoreError;
use crate::translate::resolver::TranslationResolver;
use crate::translate::{Lang, TranslationRecord};

/// One submit action from the UI.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub raw_name: String,
    pub input_lang: Lang,
    pub category: Category,
    pub quantity: f64,
    pub unit: Unit,
    pub requester: Requester,
    pub supplier: Supplier,
    pub estimated_cost: f64,
    /// Opt-in: persist this submission as a catalog quick pick once
    /// resolved. Set only when the item was not picked from the catalog.
    pub save_to_catalog: bool,
}

/// Message sent back by a finished resolution task.
struct ResolutionDone {
    line_id: String,
    names: TranslationRecord,
    catalog: Option<CatalogSaveBack>,
}

struct CatalogSaveBack {
    category: Category,
    default_cost: f64,
    default_supplier: Supplier,
}

pub struct OrderService {
    resolver: Arc<TranslationResolver>,
    orders: Arc<OrderListStore>,
    done_tx: mpsc::UnboundedSender<ResolutionDone>,
}

impl OrderService {
    /// Wire the service and start the updater loop that applies resolution
    /// results to the store. Must run inside a tokio runtime.
    pub fn start(
        resolver: Arc<TranslationResolver>,
        orders: Arc<OrderListStore>,
        catalog: Arc<CatalogReconciler>,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        tokio::spawn(updater_loop(done_rx, Arc::clone(&orders), catalog));
        Self {
            resolver,
            orders,
            done_tx,
        }
    }

    /// Create the order line and kick off background resolution.
    ///
    /// Returns as soon as the pending line is stored; until the resolution
    /// patch lands the caller shows the raw name in every language slot.
    /// The append failure is the one error a submitter must handle.
    pub fn submit(&self, request: SubmitRequest) -> Result<String, StoreError> {
        let line = OrderLine::new_pending(
            &request.raw_name,
            request.input_lang,
            request.category,
            request.quantity,
            request.unit,
            request.requester,
            request.supplier,
            request.estimated_cost,
        );
        let id = self.orders.append(line)?;
        debug!(id = %id, name = %request.raw_name, "order line created, resolution pending");

        let resolver = Arc::clone(&self.resolver);
        let done_tx = self.done_tx.clone();
        let line_id = id.clone();
        tokio::spawn(async move {
            let names = resolver
                .resolve(&request.raw_name, request.input_lang)
                .await;
            let catalog = request.save_to_catalog.then(|| CatalogSaveBack {
                category: request.category,
                default_cost: request.estimated_cost,
                default_supplier: request.supplier,
            });
            if done_tx
                .send(ResolutionDone {
                    line_id,
                    names,
                    catalog,
                })
                .is_err()
            {
                warn!("resolution result dropped (updater loop gone)");
            }
        });

        Ok(id)
    }
}

/// Applies resolution results in arrival order. Within one line the catalog
/// write-back runs strictly after resolution; both writes are best-effort
/// and never roll back the already-created line.
async fn updater_loop(
    mut rx: mpsc::UnboundedReceiver<ResolutionDone>,
    orders: Arc<OrderListStore>,
    catalog: Arc<CatalogReconciler>,
) {
    while let Some(done) = rx.recv().await {
        if let Err(e) = orders.patch(&done.line_id, &OrderPatch::resolved(done.names.clone())) {
            warn!(id = %done.line_id, error = %e, "resolution patch failed");
        }
        if let Some(save) = done.catalog {
            match catalog.save_selection_as_entry(
                done.names,
                save.category,
                save.default_cost,
                save.default_supplier,
            ) {
                Ok(entry_id) => info!(entry = %entry_id, "submission saved to catalog"),
                Err(e) => warn!(error = %e, "catalog save-back failed (order line unaffected)"),
            }
        }
    }
    info!("resolution updater loop exiting (channel closed)");
}

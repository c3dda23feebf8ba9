//! End-to-end submission pipeline over in-memory collections: pending
//! append, background resolution, in-place patch, cache warm-up, catalog
//! save-back, and supplier batching.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use pastillo::build_context;
use pastillo::order::aggregate::{build_dispatch_message, compute_total_cost, group_pending_by_supplier};
use pastillo::order::{Category, OrderLine, Requester, Supplier, Unit};
use pastillo::store::memory::MemoryStore;
use pastillo::submit::SubmitRequest;
use pastillo::translate::{Lang, RawTranslations, TranslateError, Translator};
use pastillo::KitchenContext;

struct CountingTranslator {
    calls: AtomicUsize,
}

impl CountingTranslator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(
        &self,
        raw_name: &str,
        _input_lang: Lang,
    ) -> Result<RawTranslations, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match raw_name {
            "Domates" => Ok(RawTranslations {
                tr: Some("Domates".into()),
                de: Some("Tomaten".into()),
                pa: Some("ਟਮਾਟਰ".into()),
            }),
            "Biber" => Err(TranslateError::ApiError("network down".into())),
            other => Ok(RawTranslations {
                tr: Some(format!("{other} (tr)")),
                de: Some(format!("{other} (de)")),
                pa: Some(format!("{other} (pa)")),
            }),
        }
    }
}

fn context(translator: Arc<CountingTranslator>) -> (Arc<MemoryStore>, KitchenContext) {
    let store = Arc::new(MemoryStore::new());
    let ctx = build_context(
        store.clone(),
        store.clone(),
        store.clone(),
        Some(translator),
    )
    .expect("context");
    (store, ctx)
}

fn request(name: &str, supplier: Supplier) -> SubmitRequest {
    SubmitRequest {
        raw_name: name.to_string(),
        input_lang: Lang::Tr,
        category: Category::Veg,
        quantity: 2.0,
        unit: Unit::Kg,
        requester: Requester::Chef,
        supplier,
        estimated_cost: 10.0,
        save_to_catalog: false,
    }
}

/// Wait until no line in the snapshot is pending anymore.
async fn wait_all_resolved(rx: &mut watch::Receiver<Vec<OrderLine>>) -> Vec<OrderLine> {
    timeout(Duration::from_secs(5), async {
        loop {
            {
                let snapshot = rx.borrow();
                if !snapshot.is_empty() && snapshot.iter().all(|l| !l.pending) {
                    return snapshot.clone();
                }
            }
            rx.changed().await.expect("snapshot channel closed");
        }
    })
    .await
    .expect("resolution timed out")
}

#[tokio::test]
async fn submission_starts_pending_and_resolves_in_place() {
    let (_store, ctx) = context(CountingTranslator::new());
    let mut rx = ctx.orders.subscribe();

    let id = ctx.service.submit(request("Domates", Supplier::Hal)).unwrap();

    // The line exists immediately, before resolution lands.
    let pending = ctx
        .orders
        .snapshot()
        .into_iter()
        .find(|l| l.id == id)
        .unwrap();
    assert!(pending.pending);
    assert_eq!(pending.display_name(Lang::De), "Domates");

    let resolved = wait_all_resolved(&mut rx).await;
    let line = resolved.iter().find(|l| l.id == id).unwrap();
    assert!(!line.pending);
    assert_eq!(line.display_name(Lang::De), "Tomaten");
    assert_eq!(line.display_name(Lang::Pa), "ਟਮਾਟਰ");
}

#[tokio::test]
async fn warm_key_skips_the_external_call() {
    let translator = CountingTranslator::new();
    let (_store, ctx) = context(Arc::clone(&translator));
    let mut rx = ctx.orders.subscribe();

    ctx.service.submit(request("Domates", Supplier::Hal)).unwrap();
    wait_all_resolved(&mut rx).await;

    // Different casing and whitespace, same normalized key.
    ctx.service.submit(request("domates ", Supplier::Hal)).unwrap();
    let lines = wait_all_resolved(&mut rx).await;

    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    assert!(lines
        .iter()
        .all(|l| l.display_name(Lang::De) == "Tomaten"));
}

#[tokio::test]
async fn failed_translation_resolves_to_identity_names() {
    let (_store, ctx) = context(CountingTranslator::new());
    let mut rx = ctx.orders.subscribe();

    ctx.service.submit(request("Biber", Supplier::Hal)).unwrap();
    let lines = wait_all_resolved(&mut rx).await;

    let line = &lines[0];
    assert!(!line.pending);
    for lang in Lang::ALL {
        assert_eq!(line.display_name(lang), "Biber");
    }
}

#[tokio::test]
async fn pending_lines_group_by_supplier_for_dispatch() {
    let (_store, ctx) = context(CountingTranslator::new());
    let mut rx = ctx.orders.subscribe();

    ctx.service.submit(request("Domates", Supplier::Metro)).unwrap();
    ctx.service.submit(request("Salatalık", Supplier::Hal)).unwrap();
    ctx.service.submit(request("Süt", Supplier::Metro)).unwrap();
    let lines = wait_all_resolved(&mut rx).await;

    let groups = group_pending_by_supplier(&lines);
    assert_eq!(groups.len(), 2);
    let metro = groups.iter().find(|g| g.supplier == Supplier::Metro).unwrap();
    let hal = groups.iter().find(|g| g.supplier == Supplier::Hal).unwrap();
    assert_eq!(metro.len(), 2);
    assert_eq!(hal.len(), 1);

    let message = build_dispatch_message(hal, Lang::Tr);
    assert!(message.starts_with("Sipariş Listesi: Hal\n"));
    assert!(message.contains("- 2 Kg Salatalık (tr)\n"));

    assert_eq!(compute_total_cost(&lines), 30.0);
}

#[tokio::test]
async fn bought_and_archived_lines_leave_the_dispatch_view() {
    let (_store, ctx) = context(CountingTranslator::new());
    let mut rx = ctx.orders.subscribe();

    let bought = ctx.service.submit(request("Domates", Supplier::Hal)).unwrap();
    let archived = ctx.service.submit(request("Süt", Supplier::Hal)).unwrap();
    let open = ctx.service.submit(request("Ayran", Supplier::Hal)).unwrap();
    wait_all_resolved(&mut rx).await;

    ctx.orders.set_bought(&bought, true).unwrap();
    ctx.orders.archive(&archived).unwrap();

    let lines = ctx.orders.snapshot();
    let groups = group_pending_by_supplier(&lines);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[0].lines[0].id, open);

    // The running budget still counts the bought line, but not the archived
    // one.
    assert_eq!(compute_total_cost(&lines), 20.0);
}

#[tokio::test]
async fn opt_in_save_back_catalogs_the_resolved_names() {
    let (_store, ctx) = context(CountingTranslator::new());
    let mut rx = ctx.orders.subscribe();

    let mut req = request("Salatalık", Supplier::Hal);
    req.save_to_catalog = true;
    req.estimated_cost = 15.0;
    ctx.service.submit(req).unwrap();
    wait_all_resolved(&mut rx).await;

    // The catalog write lands after the resolution patch; poll briefly.
    let entry = timeout(Duration::from_secs(5), async {
        loop {
            let veg = ctx.catalog.list_by_category(Category::Veg).unwrap();
            if let Some(entry) = veg.into_iter().find(|e| e.names.tr == "Salatalık (tr)") {
                return entry;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("catalog save-back timed out");

    assert_eq!(entry.names.de, "Salatalık (de)");
    assert_eq!(entry.default_cost, 15.0);
    assert_eq!(entry.default_supplier, Supplier::Hal);
}

//! Live order list: append/patch over the persistent collection plus a
//! watch channel that pushes the full snapshot (newest first) to
//! subscribers on every change. Receivers always observe the freshest
//! snapshot; intermediate states may be skipped.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::store::{OrderCollection, StoreError};

use super::{OrderLine, OrderPatch};

pub struct OrderListStore {
    collection: Arc<dyn OrderCollection>,
    snapshot_tx: watch::Sender<Vec<OrderLine>>,
    snapshot_rx: watch::Receiver<Vec<OrderLine>>,
}

impl OrderListStore {
    pub fn new(collection: Arc<dyn OrderCollection>) -> Result<Self, StoreError> {
        let initial = collection.load_all()?;
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        Ok(Self {
            collection,
            snapshot_tx,
            snapshot_rx,
        })
    }

    /// Append a new line and return its id. This is the one write whose
    /// failure the caller must see: without a created record nothing
    /// downstream can proceed.
    pub fn append(&self, line: OrderLine) -> Result<String, StoreError> {
        let id = line.id.clone();
        self.collection.append(&line)?;
        self.publish();
        Ok(id)
    }

    /// Apply a partial-field patch to one line and republish the snapshot.
    pub fn patch(&self, id: &str, patch: &OrderPatch) -> Result<(), StoreError> {
        self.collection.patch(id, patch)?;
        self.publish();
        Ok(())
    }

    /// Mark a line bought or not bought. Sets/clears the bought timestamp.
    pub fn set_bought(&self, id: &str, bought: bool) -> Result<(), StoreError> {
        self.patch(id, &OrderPatch::bought(bought))
    }

    /// Archive a line, removing it from every aggregation view. Terminal:
    /// there is no unarchive, and archiving twice equals archiving once.
    pub fn archive(&self, id: &str) -> Result<(), StoreError> {
        self.patch(id, &OrderPatch::archive())
    }

    /// Subscribe to live snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Vec<OrderLine>> {
        self.snapshot_rx.clone()
    }

    /// Current snapshot without subscribing.
    pub fn snapshot(&self) -> Vec<OrderLine> {
        self.snapshot_rx.borrow().clone()
    }

    fn publish(&self) {
        match self.collection.load_all() {
            Ok(lines) => {
                let _ = self.snapshot_tx.send(lines);
            }
            Err(e) => warn!(error = %e, "snapshot reload failed, keeping previous snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Category, Requester, Supplier, Unit};
    use crate::store::memory::MemoryStore;
    use crate::translate::{Lang, TranslationRecord};

    fn store() -> OrderListStore {
        OrderListStore::new(Arc::new(MemoryStore::new())).unwrap()
    }

    fn line(name: &str) -> OrderLine {
        OrderLine::new_pending(
            name,
            Lang::Tr,
            Category::Veg,
            1.0,
            Unit::Piece,
            Requester::Bar,
            Supplier::Metro,
            0.0,
        )
    }

    #[test]
    fn append_publishes_the_new_line_newest_first() {
        let store = store();
        store.append(line("Domates")).unwrap();
        store.append(line("Biber")).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].raw_name, "Biber");
        assert!(snapshot[0].pending);
    }

    #[test]
    fn resolution_patch_clears_pending_in_place() {
        let store = store();
        let id = store.append(line("Domates")).unwrap();
        store
            .patch(&id, &OrderPatch::resolved(TranslationRecord::identity("Domates")))
            .unwrap();

        let snapshot = store.snapshot();
        assert!(!snapshot[0].pending);
        assert!(snapshot[0].names.is_some());
    }

    #[test]
    fn bought_toggle_sets_and_clears_the_timestamp() {
        let store = store();
        let id = store.append(line("Süt")).unwrap();

        store.set_bought(&id, true).unwrap();
        assert!(store.snapshot()[0].bought_at.is_some());

        store.set_bought(&id, false).unwrap();
        let snapshot = store.snapshot();
        assert!(!snapshot[0].bought);
        assert_eq!(snapshot[0].bought_at, None);
    }

    #[test]
    fn archive_is_idempotent_and_terminal() {
        let store = store();
        let id = store.append(line("Ayran")).unwrap();

        store.archive(&id).unwrap();
        let once = store.snapshot();
        store.archive(&id).unwrap();
        let twice = store.snapshot();

        assert!(once[0].archived);
        assert_eq!(once[0].archived, twice[0].archived);
        assert_eq!(once[0].bought, twice[0].bought);
    }

    #[tokio::test]
    async fn subscribers_see_every_published_change() {
        let store = store();
        let mut rx = store.subscribe();
        assert!(rx.borrow().is_empty());

        store.append(line("Domates")).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}

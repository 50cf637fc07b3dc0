//! CRUD operations a transport layer calls for single purchases.

use crate::domain::Purchase;
use crate::errors::{Committed, CoreResult};
use crate::normalize::RawPurchase;
use crate::store::PurchaseStore;

/// Validated create/read/update/delete over the record store.
pub struct PurchaseService;

impl PurchaseService {
    /// Normalizes and commits a new purchase. Warnings (total mismatch) ride
    /// along with the committed aggregate.
    pub fn create(store: &PurchaseStore, payload: RawPurchase) -> CoreResult<Committed<Purchase>> {
        store.create(payload)
    }

    /// Full-replacement update of nested structures, scalar merge on top-level
    /// fields. Fails with `NotFound` before touching anything.
    pub fn update(
        store: &PurchaseStore,
        id: &str,
        payload: RawPurchase,
    ) -> CoreResult<Committed<Purchase>> {
        store.update(id, payload)
    }

    pub fn delete(store: &PurchaseStore, id: &str) -> CoreResult<()> {
        store.delete(id)
    }

    pub fn get(store: &PurchaseStore, id: &str) -> CoreResult<Purchase> {
        store.get(id)
    }
}

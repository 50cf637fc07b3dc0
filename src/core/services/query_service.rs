use crate::query::{self, Page, PurchaseSummary, QuerySpec};
use crate::store::PurchaseStore;

/// List queries over the store's current snapshot.
pub struct QueryService;

impl QueryService {
    pub fn list(store: &PurchaseStore, spec: &QuerySpec) -> Page<PurchaseSummary> {
        query::query(store, spec)
    }
}

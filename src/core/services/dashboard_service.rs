use crate::store::PurchaseStore;
use crate::summary::{self, DashboardSummary, ReportSpec};

/// Derived dashboard views over the store's current snapshot.
pub struct DashboardService;

impl DashboardService {
    pub fn summary(store: &PurchaseStore, spec: &ReportSpec) -> DashboardSummary {
        summary::summarize(store, spec)
    }
}

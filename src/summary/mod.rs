//! Dashboard aggregation: status totals, category spend for one month,
//! upcoming warranty expiries, and recent activity.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::derive::{live_warranties, warranty_days_left};
use crate::domain::{ExtractStatus, Purchase, WarrantyLevel, WarrantyStatus};
use crate::money::cents_to_major;
use crate::store::PurchaseStore;

pub const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 60;
pub const DEFAULT_RECENT_LIMIT: usize = 5;
const MAX_EXPIRY_ENTRIES: usize = 6;
const UNCATEGORIZED: &str = "uncategorized";
const REPORT_CURRENCY: &str = "USD";

/// Reporting window specification.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    /// Calendar month as `"YYYY-MM"`; `None` means the current month.
    pub month: Option<String>,
    pub expiring_window_days: i64,
    pub recent_limit: usize,
}

impl Default for ReportSpec {
    fn default() -> Self {
        Self {
            month: None,
            expiring_window_days: DEFAULT_EXPIRING_WINDOW_DAYS,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub totals: StatusTotals,
    pub recent: Vec<RecentPurchase>,
    pub upcoming_expiries: Vec<ExpiringWarranty>,
    pub by_category: Vec<CategorySpend>,
}

/// Purchase counts by derived warranty status, plus summed spend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusTotals {
    pub count: usize,
    pub in_warranty: usize,
    pub expired: usize,
    pub unknown: usize,
    pub sum_cents: i64,
    pub currency: String,
}

/// Recent-activity projection.
#[derive(Debug, Clone, Serialize)]
pub struct RecentPurchase {
    pub id: String,
    pub merchant_name: String,
    pub occurred_at: DateTime<Utc>,
    pub total_cents: i64,
    pub currency: String,
    pub warranty_status: WarrantyStatus,
    pub extract_status: ExtractStatus,
    pub first_line_item: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiringWarranty {
    pub purchase_id: String,
    pub merchant_name: String,
    pub warranty_id: Uuid,
    pub level: WarrantyLevel,
    pub line_item_name: Option<String>,
    pub end_date: NaiveDate,
    pub days_left: i64,
}

/// Spend for one category within the reporting month, in major units.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySpend {
    pub category_id: String,
    pub spend: f64,
    pub item_count: usize,
}

/// Computes the dashboard view over one consistent snapshot of the store.
pub fn summarize(store: &PurchaseStore, spec: &ReportSpec) -> DashboardSummary {
    let today = store
        .config()
        .today
        .unwrap_or_else(|| Utc::now().date_naive());
    let month = spec
        .month
        .clone()
        .unwrap_or_else(|| today.format("%Y-%m").to_string());
    let snapshot = store.snapshot();

    DashboardSummary {
        totals: totals(&snapshot),
        recent: recent(&snapshot, spec.recent_limit),
        upcoming_expiries: upcoming_expiries(&snapshot, today, spec.expiring_window_days),
        by_category: by_category(&snapshot, &month),
    }
}

fn totals(snapshot: &[Purchase]) -> StatusTotals {
    let mut totals = StatusTotals {
        currency: REPORT_CURRENCY.into(),
        ..StatusTotals::default()
    };
    for purchase in snapshot {
        totals.count += 1;
        totals.sum_cents += purchase.amounts.total_cents;
        match purchase.warranty_status {
            WarrantyStatus::InWarranty => totals.in_warranty += 1,
            WarrantyStatus::Expired => totals.expired += 1,
            WarrantyStatus::Unknown => totals.unknown += 1,
        }
    }
    totals
}

fn recent(snapshot: &[Purchase], limit: usize) -> Vec<RecentPurchase> {
    let mut ordered: Vec<&Purchase> = snapshot.iter().collect();
    ordered.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    ordered
        .into_iter()
        .take(limit)
        .map(|purchase| RecentPurchase {
            id: purchase.id.clone(),
            merchant_name: purchase.merchant.name.clone(),
            occurred_at: purchase.occurred_at,
            total_cents: purchase.amounts.total_cents,
            currency: purchase.currency.clone(),
            warranty_status: purchase.warranty_status,
            extract_status: purchase.extract_status,
            first_line_item: purchase.first_line_item_name().map(str::to_string),
        })
        .collect()
}

/// Warranties ending within `[today, today + window_days]` inclusive, closest
/// first, capped at six entries. Expired warranties and warranties with no
/// end date are excluded outright.
fn upcoming_expiries(
    snapshot: &[Purchase],
    today: NaiveDate,
    window_days: i64,
) -> Vec<ExpiringWarranty> {
    let mut entries = Vec::new();
    for purchase in snapshot {
        for warranty in live_warranties(purchase) {
            let (Some(end_date), Some(days_left)) =
                (warranty.end_date, warranty_days_left(warranty, today))
            else {
                continue;
            };
            if !(0..=window_days).contains(&days_left) {
                continue;
            }
            let line_item_name = warranty.line_item_id.as_deref().and_then(|item_id| {
                purchase.line_item(item_id).map(|item| item.name.clone())
            });
            entries.push(ExpiringWarranty {
                purchase_id: purchase.id.clone(),
                merchant_name: purchase.merchant.name.clone(),
                warranty_id: warranty.id,
                level: warranty.level,
                line_item_name,
                end_date,
                days_left,
            });
        }
    }
    entries.sort_by(|a, b| a.days_left.cmp(&b.days_left));
    entries.truncate(MAX_EXPIRY_ENTRIES);
    entries
}

/// Groups the month's line items by category, summing line totals. Spend is
/// accumulated in cents and only converted to major units at the edge.
fn by_category(snapshot: &[Purchase], month: &str) -> Vec<CategorySpend> {
    let mut buckets: HashMap<String, (i64, usize)> = HashMap::new();
    for purchase in snapshot {
        if purchase.occurred_at.format("%Y-%m").to_string() != month {
            continue;
        }
        for item in &purchase.line_items {
            let key = item
                .category_id
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            let bucket = buckets.entry(key).or_insert((0, 0));
            bucket.0 += item.line_total_cents;
            bucket.1 += 1;
        }
    }
    let mut spends: Vec<(String, i64, usize)> = buckets
        .into_iter()
        .map(|(category, (cents, items))| (category, cents, items))
        .collect();
    spends.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    spends
        .into_iter()
        .map(|(category_id, cents, item_count)| CategorySpend {
            category_id,
            spend: cents_to_major(cents),
            item_count,
        })
        .collect()
}

//! Parameterized list queries over the store's current snapshot: text search,
//! category and warranty-status filters, stable sorts, pagination.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ExtractStatus, Purchase, WarrantyStatus};
use crate::store::PurchaseStore;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Filter/sort/pagination specification. Absent filters match everything.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub text: Option<String>,
    pub category_id: Option<String>,
    pub warranty_status: Option<String>,
    pub sort: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            text: None,
            category_id: None,
            warranty_status: None,
            sort: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    OccurredAtAsc,
    #[default]
    OccurredAtDesc,
    TotalAsc,
    TotalDesc,
}

impl SortOrder {
    /// Accepts the wire tokens the consuming layer has always sent.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "date_asc" => Some(SortOrder::OccurredAtAsc),
            "date_desc" => Some(SortOrder::OccurredAtDesc),
            "amount_asc" => Some(SortOrder::TotalAsc),
            "amount_desc" => Some(SortOrder::TotalDesc),
            _ => None,
        }
    }
}

/// One page of results plus the post-filter total.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

/// Reduced list projection; never the full aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseSummary {
    pub id: String,
    pub merchant_name: String,
    pub occurred_at: DateTime<Utc>,
    pub total_cents: i64,
    pub currency: String,
    pub warranty_status: WarrantyStatus,
    pub extract_status: ExtractStatus,
    pub has_warranty_items: bool,
    pub snippet: Option<String>,
}

impl PurchaseSummary {
    fn of(purchase: &Purchase, needle: Option<&str>) -> Self {
        Self {
            id: purchase.id.clone(),
            merchant_name: purchase.merchant.name.clone(),
            occurred_at: purchase.occurred_at,
            total_cents: purchase.amounts.total_cents,
            currency: purchase.currency.clone(),
            warranty_status: purchase.warranty_status,
            extract_status: purchase.extract_status,
            has_warranty_items: purchase
                .line_items
                .iter()
                .any(|item| item.warranty.as_ref().is_some_and(|w| w.end_date.is_some())),
            snippet: needle.and_then(|needle| snippet(purchase, needle)),
        }
    }
}

/// Runs the query over one snapshot of the store: filter, stable sort, then
/// paginate. `total` counts the post-filter, pre-pagination set; out-of-range
/// pages yield an empty slice.
pub fn query(store: &PurchaseStore, spec: &QuerySpec) -> Page<PurchaseSummary> {
    let needle = spec
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<Purchase> = store
        .snapshot()
        .into_iter()
        .filter(|p| matches_text(p, needle.as_deref()))
        .filter(|p| matches_category(p, spec.category_id.as_deref()))
        .filter(|p| matches_status(p, spec.warranty_status.as_deref()))
        .collect();

    match spec.sort {
        SortOrder::OccurredAtAsc => matches.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at)),
        SortOrder::OccurredAtDesc => matches.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at)),
        SortOrder::TotalAsc => {
            matches.sort_by(|a, b| a.amounts.total_cents.cmp(&b.amounts.total_cents))
        }
        SortOrder::TotalDesc => {
            matches.sort_by(|a, b| b.amounts.total_cents.cmp(&a.amounts.total_cents))
        }
    }

    let total = matches.len();
    let page = spec.page.max(1);
    let page_size = spec.page_size;
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    let items = matches[start..end]
        .iter()
        .map(|p| PurchaseSummary::of(p, needle.as_deref()))
        .collect();

    Page {
        items,
        page,
        page_size,
        total,
    }
}

fn matches_text(purchase: &Purchase, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => purchase.search_blob.contains(needle),
    }
}

fn matches_category(purchase: &Purchase, category: Option<&str>) -> bool {
    match category.map(str::trim).filter(|c| !c.is_empty() && *c != "all") {
        None => true,
        Some(category) => purchase.line_items.iter().any(|item| {
            item.category_id
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        }),
    }
}

fn matches_status(purchase: &Purchase, status: Option<&str>) -> bool {
    match status.map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
        None => true,
        Some(status) => purchase.warranty_status.as_str() == status,
    }
}

/// Best-effort explanation of why a record matched a text query, first of:
/// merchant name, line-item name, line-item category, notes.
fn snippet(purchase: &Purchase, needle: &str) -> Option<String> {
    if purchase.merchant.name.to_lowercase().contains(needle) {
        return Some(format!("Merchant match: {}", purchase.merchant.name));
    }
    for item in &purchase.line_items {
        if item.name.to_lowercase().contains(needle) {
            return Some(format!("Item match: {}", item.name));
        }
    }
    for item in &purchase.line_items {
        if let Some(category) = &item.category_id {
            if category.to_lowercase().contains(needle) {
                return Some(format!("Category match: {category}"));
            }
        }
    }
    if purchase.notes.to_lowercase().contains(needle) {
        return Some(format!("Notes match: {}", purchase.notes));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_tokens_parse_to_orders() {
        assert_eq!(SortOrder::parse("date_desc"), Some(SortOrder::OccurredAtDesc));
        assert_eq!(SortOrder::parse("amount_asc"), Some(SortOrder::TotalAsc));
        assert_eq!(SortOrder::parse("by_vibes"), None);
    }
}

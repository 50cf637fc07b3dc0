//! Derived purchase state: aggregate warranty status and the search blob.
//! Pure functions of the current snapshot, recomputed after every mutation.

use chrono::NaiveDate;

use crate::domain::{Purchase, Warranty, WarrantyStatus};
use crate::money::days_until;

/// Fields recomputed on every write.
#[derive(Debug, Clone)]
pub struct DerivedState {
    pub warranty_status: WarrantyStatus,
    pub search_blob: String,
}

pub fn derive_state(purchase: &Purchase, today: NaiveDate) -> DerivedState {
    DerivedState {
        warranty_status: warranty_status(purchase, today),
        search_blob: search_blob(purchase),
    }
}

/// Aggregate status over every live warranty on the purchase. A single
/// still-valid warranty wins over any number of expired ones; no live
/// warranty end dates at all means the status is unknown.
pub fn warranty_status(purchase: &Purchase, today: NaiveDate) -> WarrantyStatus {
    let mut any_end_date = false;
    for warranty in live_warranties(purchase) {
        if let Some(end) = warranty.end_date {
            any_end_date = true;
            if end >= today {
                return WarrantyStatus::InWarranty;
            }
        }
    }
    if any_end_date {
        WarrantyStatus::Expired
    } else {
        WarrantyStatus::Unknown
    }
}

/// Every warranty that counts toward derived state and expiry reporting: the
/// purchase-level one plus item warranties marked applicable.
pub fn live_warranties(purchase: &Purchase) -> impl Iterator<Item = &Warranty> {
    purchase.warranty.iter().chain(
        purchase
            .line_items
            .iter()
            .filter(|item| item.warranty_applicable)
            .filter_map(|item| item.warranty.as_ref()),
    )
}

/// Whole days of coverage left, `None` when the end date is unknown.
pub fn warranty_days_left(warranty: &Warranty, today: NaiveDate) -> Option<i64> {
    warranty.end_date.map(|end| days_until(today, end))
}

/// Lowercase single-space join of merchant name, notes, line-item names, and
/// category ids. Backs case-insensitive substring search only.
pub fn search_blob(purchase: &Purchase) -> String {
    let mut parts: Vec<String> = Vec::new();
    push_lower(&mut parts, &purchase.merchant.name);
    push_lower(&mut parts, &purchase.notes);
    for item in &purchase.line_items {
        push_lower(&mut parts, &item.name);
        if let Some(category) = &item.category_id {
            push_lower(&mut parts, category);
        }
    }
    parts.join(" ")
}

fn push_lower(parts: &mut Vec<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_lowercase());
    }
}

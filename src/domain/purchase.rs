use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::line_item::LineItem;
use super::merchant::Merchant;
use super::warranty::{Warranty, WarrantyStatus};

/// Root aggregate: one transaction, its line items, and its warranties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchase {
    pub id: String,
    pub merchant: Merchant,
    pub occurred_at: DateTime<Utc>,
    pub currency: String,
    pub amounts: Amounts,
    pub payment_method_type: String,
    pub notes: String,
    /// Free-form posted/pending marker passed through from the source.
    pub status: String,
    /// Insertion order is significant: the first item doubles as the display
    /// fallback.
    pub line_items: Vec<LineItem>,
    /// Warranty scoped to the whole purchase.
    pub warranty: Option<Warranty>,
    pub document_id: Option<String>,
    pub extract_status: ExtractStatus,
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived on every write, never trusted from input.
    pub warranty_status: WarrantyStatus,
    /// Derived lowercase text blob backing substring search.
    pub search_blob: String,
}

impl Purchase {
    pub fn first_line_item_name(&self) -> Option<&str> {
        self.line_items.first().map(|item| item.name.as_str())
    }

    pub fn line_item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id == id)
    }

    pub fn line_item_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.line_items.iter_mut().find(|item| item.id == id)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Monetary breakdown of a purchase, in integer minor units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amounts {
    /// Always recomputed as the sum of line-item totals.
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub tip_cents: i64,
    pub discount_cents: i64,
    /// Stored as supplied; mismatches against the computed sum raise a
    /// non-fatal warning instead of being corrected.
    pub total_cents: i64,
}

impl Amounts {
    /// The total implied by the other components.
    pub fn computed_total_cents(&self) -> i64 {
        self.subtotal_cents + self.tax_cents + self.tip_cents - self.discount_cents
    }
}

/// Source-document extraction lifecycle, opaque to this core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Failed,
}

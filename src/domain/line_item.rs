use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::warranty::Warranty;

/// One purchased unit (or group of units) within a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub category_id: Option<String>,
    pub returnable_until: Option<NaiveDate>,
    pub warranty_applicable: bool,
    /// Only meaningful when `warranty_applicable` is set.
    pub warranty: Option<Warranty>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity: 0,
            unit_price_cents: 0,
            line_total_cents: 0,
            category_id: None,
            returnable_until: None,
            warranty_applicable: false,
            warranty: None,
            attachments: Vec::new(),
        }
    }

    /// Placeholder item synthesized when an upload targets a line-item id the
    /// purchase does not have. Uploads are never dropped.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(id, "Unknown item")
    }
}

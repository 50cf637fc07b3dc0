use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coverage record scoped either to a whole purchase or to one line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Warranty {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: WarrantyType,
    pub provider: String,
    pub policy_number: String,
    pub start_date: Option<NaiveDate>,
    /// `None` means the coverage window is unknown, not open-ended.
    pub end_date: Option<NaiveDate>,
    pub terms_url: String,
    pub coverage_notes: String,
    pub warranty_doc_id: String,
    pub level: WarrantyLevel,
    /// Back-reference for item-level warranties, used for lookup only.
    pub line_item_id: Option<String>,
}

impl Warranty {
    pub fn new(kind: WarrantyType, level: WarrantyLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            provider: String::new(),
            policy_number: String::new(),
            start_date: None,
            end_date: None,
            terms_url: String::new(),
            coverage_notes: String::new(),
            warranty_doc_id: String::new(),
            level,
            line_item_id: None,
        }
    }
}

/// Who stands behind the coverage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyType {
    #[default]
    Manufacturer,
    Retailer,
    Extended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyLevel {
    Purchase,
    Item,
}

/// Aggregate warranty status derived from every live warranty on a purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyStatus {
    InWarranty,
    Expired,
    #[default]
    Unknown,
}

impl WarrantyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyStatus::InWarranty => "in_warranty",
            WarrantyStatus::Expired => "expired",
            WarrantyStatus::Unknown => "unknown",
        }
    }
}

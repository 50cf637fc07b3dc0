use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifier used when a merchant name is missing or yields an empty slug.
pub const GENERIC_MERCHANT_ID: &str = "generic-merchant";

/// Seller a purchase was made from. Merchant ids are slugs derived from the
/// display name unless the caller supplies one explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location_text: String,
}

impl Merchant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location_text: String::new(),
        }
    }

    pub fn generic() -> Self {
        Self::new(GENERIC_MERCHANT_ID, "Unknown")
    }
}

/// Derives a stable merchant id from a display name: lowercase, with runs of
/// non-alphanumeric characters collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut pending_separator = false;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        GENERIC_MERCHANT_ID.to_string()
    } else {
        slug
    }
}

/// Registry of merchants upserted as a side effect of purchase writes.
/// Merchants are never independently deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantRegistry {
    merchants: HashMap<String, Merchant>,
}

impl MerchantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a candidate against the registry. An already-registered id
    /// keeps its registered display name, so resolution is idempotent.
    pub fn resolve(&self, candidate: Merchant) -> Merchant {
        match self.merchants.get(&candidate.id) {
            Some(existing) => {
                let mut resolved = existing.clone();
                if resolved.location_text.is_empty() {
                    resolved.location_text = candidate.location_text;
                }
                resolved
            }
            None => candidate,
        }
    }

    pub fn upsert(&mut self, merchant: Merchant) {
        self.merchants
            .entry(merchant.id.clone())
            .or_insert(merchant);
    }

    pub fn get(&self, id: &str) -> Option<&Merchant> {
        self.merchants.get(id)
    }

    pub fn len(&self) -> usize {
        self.merchants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merchants.is_empty()
    }
}

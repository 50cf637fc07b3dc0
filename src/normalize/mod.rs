//! Canonical record normalizer. External payloads and seed fixtures arrive in
//! several ad-hoc shapes; everything funnels through [`normalize`] into the
//! one canonical [`Purchase`] before it can touch the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    merchant, Amounts, ExtractStatus, LineItem, Merchant, MerchantRegistry, Purchase, Warranty,
    WarrantyLevel, WarrantyStatus, WarrantyType,
};
use crate::errors::{CoreError, CoreResult};
use crate::money::MoneyInput;

/// Loosely-typed purchase payload. Field aliases cover the naming conventions
/// seen in the wild; every field is optional and resolved by one deterministic
/// mapping in [`normalize`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPurchase {
    #[serde(alias = "merchant_name")]
    pub merchant: Option<RawMerchant>,
    pub occurred_at: Option<String>,
    pub purchase_datetime: Option<String>,
    pub purchase_time: Option<String>,
    pub purchase_date: Option<String>,
    pub currency: Option<String>,
    /// Structured pre-computed cents, when the caller has them.
    pub amounts: Option<RawAmounts>,
    pub tax: Option<MoneyInput>,
    pub tip: Option<MoneyInput>,
    pub discount: Option<MoneyInput>,
    #[serde(alias = "total_amount")]
    pub total: Option<MoneyInput>,
    pub payment_method_type: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "items")]
    pub line_items: Option<Vec<RawLineItem>>,
    pub warranty: Option<RawWarranty>,
    /// Display fallbacks used to reconstruct a line item from empty input.
    pub product_name: Option<String>,
    pub title: Option<String>,
    pub document_id: Option<String>,
    pub extract_status: Option<ExtractStatus>,
    pub confidence_score: Option<f64>,
}

/// Merchant input: either a bare display name or a structured record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawMerchant {
    Name(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, alias = "location")]
        location_text: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAmounts {
    pub subtotal_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub tip_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub total_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLineItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price_cents: Option<i64>,
    #[serde(alias = "price")]
    pub unit_price: Option<MoneyInput>,
    pub line_total_cents: Option<i64>,
    pub line_total: Option<MoneyInput>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    pub returnable_until: Option<String>,
    pub warranty_applicable: Option<bool>,
    pub warranty: Option<RawWarranty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWarranty {
    #[serde(rename = "type")]
    pub kind: Option<WarrantyType>,
    pub provider: Option<String>,
    pub policy_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub terms_url: Option<String>,
    pub coverage_notes: Option<String>,
    pub warranty_doc_id: Option<String>,
}

/// Normalizes a raw payload into a canonical purchase. The returned aggregate
/// has no store-assigned fields yet: id is empty, timestamps are `now`, and
/// derived state is default until the store commits it.
///
/// Validation failures are reported before any mutation happens; the registry
/// is only read here, never written.
pub fn normalize(
    raw: RawPurchase,
    registry: &MerchantRegistry,
    now: DateTime<Utc>,
) -> CoreResult<Purchase> {
    let occurred_at = resolve_occurred_at(&raw, now)?;
    let merchant = registry.resolve(resolve_merchant(raw.merchant));

    let mut line_items = Vec::new();
    for raw_item in raw.line_items.unwrap_or_default() {
        line_items.push(normalize_line_item(raw_item)?);
    }
    if line_items.is_empty() {
        line_items.push(fallback_line_item(
            raw.product_name.as_deref(),
            raw.title.as_deref(),
            resolve_total_hint(raw.amounts.as_ref(), raw.total.as_ref()),
        ));
    }

    let subtotal_cents: i64 = line_items.iter().map(|item| item.line_total_cents).sum();
    let structured = raw.amounts.unwrap_or_default();
    let tax_cents = resolve_cents(structured.tax_cents, raw.tax.as_ref());
    let tip_cents = resolve_cents(structured.tip_cents, raw.tip.as_ref());
    let discount_cents = resolve_cents(structured.discount_cents, raw.discount.as_ref());
    let computed_total = subtotal_cents + tax_cents + tip_cents - discount_cents;
    let total_cents = structured
        .total_cents
        .or_else(|| raw.total.as_ref().map(MoneyInput::to_cents))
        .unwrap_or(computed_total);

    let warranty = raw
        .warranty
        .map(|w| normalize_warranty(w, WarrantyLevel::Purchase, None))
        .transpose()?;

    Ok(Purchase {
        id: String::new(),
        merchant,
        occurred_at,
        currency: raw
            .currency
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.trim().to_uppercase())
            .unwrap_or_else(|| "USD".to_string()),
        amounts: Amounts {
            subtotal_cents,
            tax_cents,
            tip_cents,
            discount_cents,
            total_cents,
        },
        payment_method_type: raw.payment_method_type.unwrap_or_default(),
        notes: raw.notes.unwrap_or_default(),
        status: raw.status.unwrap_or_default(),
        line_items,
        warranty,
        document_id: raw.document_id,
        extract_status: raw.extract_status.unwrap_or_default(),
        confidence_score: raw.confidence_score,
        attachments: Vec::new(),
        created_at: now,
        updated_at: now,
        warranty_status: WarrantyStatus::Unknown,
        search_blob: String::new(),
    })
}

/// Backfills scalar top-level fields of an update payload from the existing
/// record. Nested structures (merchant, line items, purchase-level warranty)
/// are deliberately left alone: updates replace them wholesale.
pub fn merge_for_update(mut raw: RawPurchase, existing: &Purchase) -> RawPurchase {
    let no_date_supplied = raw.occurred_at.is_none()
        && raw.purchase_datetime.is_none()
        && raw.purchase_time.is_none()
        && raw.purchase_date.is_none();
    if no_date_supplied {
        raw.occurred_at = Some(existing.occurred_at.to_rfc3339());
    }
    if raw.currency.is_none() {
        raw.currency = Some(existing.currency.clone());
    }
    if raw.notes.is_none() {
        raw.notes = Some(existing.notes.clone());
    }
    if raw.status.is_none() {
        raw.status = Some(existing.status.clone());
    }
    if raw.payment_method_type.is_none() {
        raw.payment_method_type = Some(existing.payment_method_type.clone());
    }

    let mut amounts = raw.amounts.take().unwrap_or_default();
    if amounts.tax_cents.is_none() && raw.tax.is_none() {
        amounts.tax_cents = Some(existing.amounts.tax_cents);
    }
    if amounts.tip_cents.is_none() && raw.tip.is_none() {
        amounts.tip_cents = Some(existing.amounts.tip_cents);
    }
    if amounts.discount_cents.is_none() && raw.discount.is_none() {
        amounts.discount_cents = Some(existing.amounts.discount_cents);
    }
    if amounts.total_cents.is_none() && raw.total.is_none() {
        amounts.total_cents = Some(existing.amounts.total_cents);
    }
    raw.amounts = Some(amounts);

    if raw.document_id.is_none() {
        raw.document_id = existing.document_id.clone();
    }
    if raw.extract_status.is_none() {
        raw.extract_status = Some(existing.extract_status);
    }
    if raw.confidence_score.is_none() {
        raw.confidence_score = existing.confidence_score;
    }
    raw
}

fn resolve_merchant(raw: Option<RawMerchant>) -> Merchant {
    match raw {
        Some(RawMerchant::Name(name)) => merchant_from_name(&name, String::new()),
        Some(RawMerchant::Full {
            id,
            name,
            location_text,
        }) => {
            let name = name.unwrap_or_default();
            let location = location_text.unwrap_or_default();
            match id.filter(|v| !v.trim().is_empty()) {
                Some(id) => Merchant {
                    id: id.trim().to_string(),
                    name: if name.trim().is_empty() {
                        "Unknown".into()
                    } else {
                        name.trim().to_string()
                    },
                    location_text: location,
                },
                None => merchant_from_name(&name, location),
            }
        }
        None => Merchant::generic(),
    }
}

fn merchant_from_name(name: &str, location_text: String) -> Merchant {
    let id = merchant::slugify(name);
    let display = if name.trim().is_empty() {
        "Unknown".to_string()
    } else {
        name.trim().to_string()
    };
    Merchant {
        id,
        name: display,
        location_text,
    }
}

fn resolve_occurred_at(raw: &RawPurchase, now: DateTime<Utc>) -> CoreResult<DateTime<Utc>> {
    let candidate = raw
        .occurred_at
        .as_deref()
        .or(raw.purchase_datetime.as_deref())
        .or(raw.purchase_time.as_deref())
        .or(raw.purchase_date.as_deref());
    match candidate.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(now),
        Some(text) => parse_datetime(text).ok_or_else(|| {
            CoreError::Validation(format!("unparsable purchase timestamp: {text}"))
        }),
    }
}

fn normalize_line_item(raw: RawLineItem) -> CoreResult<LineItem> {
    let name = raw
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CoreError::Validation("line item has no derivable name".into()))?;

    let quantity = raw.quantity.unwrap_or(1);
    let unit_price_cents = resolve_cents(raw.unit_price_cents, raw.unit_price.as_ref());
    // An explicitly supplied line total is trusted as-is.
    let line_total_cents = raw
        .line_total_cents
        .or_else(|| raw.line_total.as_ref().map(MoneyInput::to_cents))
        .unwrap_or(unit_price_cents * i64::from(quantity));

    let id = raw
        .id
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(generate_line_item_id);
    let warranty = raw
        .warranty
        .map(|w| normalize_warranty(w, WarrantyLevel::Item, Some(id.clone())))
        .transpose()?;

    Ok(LineItem {
        id,
        name,
        quantity,
        unit_price_cents,
        line_total_cents,
        category_id: raw.category_id.filter(|c| !c.trim().is_empty()),
        returnable_until: raw
            .returnable_until
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(parse_date),
        warranty_applicable: raw.warranty_applicable.unwrap_or(warranty.is_some()),
        warranty,
        attachments: Vec::new(),
    })
}

/// Fills structural defaults so downstream code never needs existence checks
/// for warranty sub-fields. An unparsable end date is a validation error; an
/// unparsable start date is treated as unset.
fn normalize_warranty(
    raw: RawWarranty,
    level: WarrantyLevel,
    line_item_id: Option<String>,
) -> CoreResult<Warranty> {
    let end_date = match raw.end_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(text) => Some(parse_date(text).ok_or_else(|| {
            CoreError::Validation(format!("unparsable warranty end date: {text}"))
        })?),
    };
    Ok(Warranty {
        id: Uuid::new_v4(),
        kind: raw.kind.unwrap_or_default(),
        provider: raw.provider.unwrap_or_default(),
        policy_number: raw.policy_number.unwrap_or_default(),
        start_date: raw
            .start_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(parse_date),
        end_date,
        terms_url: raw.terms_url.unwrap_or_default(),
        coverage_notes: raw.coverage_notes.unwrap_or_default(),
        warranty_doc_id: raw.warranty_doc_id.unwrap_or_default(),
        level,
        line_item_id,
    })
}

fn fallback_line_item(
    product_name: Option<&str>,
    title: Option<&str>,
    total_cents: Option<i64>,
) -> LineItem {
    let name = product_name
        .or(title)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Untitled");
    let mut item = LineItem::new(generate_line_item_id(), name);
    item.quantity = 1;
    let total = total_cents.unwrap_or(0);
    item.unit_price_cents = total;
    item.line_total_cents = total;
    item
}

fn resolve_total_hint(amounts: Option<&RawAmounts>, total: Option<&MoneyInput>) -> Option<i64> {
    amounts
        .and_then(|a| a.total_cents)
        .or_else(|| total.map(MoneyInput::to_cents))
}

fn resolve_cents(cents: Option<i64>, decimal: Option<&MoneyInput>) -> i64 {
    cents
        .or_else(|| decimal.map(MoneyInput::to_cents))
        .unwrap_or(0)
}

fn generate_line_item_id() -> String {
    let code = Uuid::new_v4().simple().to_string();
    format!("li-{}", &code[..8])
}

/// Parses a timestamp: RFC 3339 first, then a bare datetime, then a bare date
/// treated as midnight UTC.
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Parses a date-only value, accepting full timestamps and keeping the date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    parse_datetime(text).map(|dt| dt.date_naive())
}

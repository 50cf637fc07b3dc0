//! Authoritative in-memory collection of purchase aggregates.
//!
//! One reader-writer lock guards the collection; it is held for the duration
//! of a single logical operation and never across two acquisitions. Readers
//! (query, aggregation) take a point-in-time snapshot; writers are mutually
//! exclusive with each other and with snapshot reads.

use std::sync::RwLock;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::derive::derive_state;
use crate::domain::{Attachment, FileUpload, LineItem, Merchant, MerchantRegistry, Purchase};
use crate::errors::{Committed, CoreError, CoreResult, Warning};
use crate::normalize::{merge_for_update, normalize, RawPurchase};

/// First purchase id is `p2001`.
const ID_SEED: u64 = 2000;

/// Knobs the surrounding process (or a test) may turn.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Simulated ingestion latency for attachment uploads. Slept before the
    /// write lock is taken, so readers keep running while a file is "in
    /// flight". Tests set this to zero.
    pub attachment_ingest_delay: Duration,
    /// Fixed "today" for warranty math; `None` uses the system clock.
    pub today: Option<NaiveDate>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            attachment_ingest_delay: Duration::from_millis(300),
            today: None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Front of the vector is the most recently created purchase.
    purchases: Vec<Purchase>,
    merchants: MerchantRegistry,
    id_counter: u64,
}

/// The single shared mutable resource of the core.
#[derive(Debug)]
pub struct PurchaseStore {
    inner: RwLock<Inner>,
    config: StoreConfig,
}

impl Default for PurchaseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PurchaseStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                purchases: Vec::new(),
                merchants: MerchantRegistry::new(),
                id_counter: ID_SEED,
            }),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn today(&self) -> NaiveDate {
        self.config.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Creates a purchase from a raw payload, derives its state, and inserts
    /// it at the front of the collection.
    pub fn create(&self, raw: RawPurchase) -> CoreResult<Committed<Purchase>> {
        let now = Utc::now();
        let today = self.today();
        let mut inner = self.inner.write().expect("store lock poisoned");

        let mut purchase = normalize(raw, &inner.merchants, now)?;
        purchase.id = next_id(&mut inner);
        purchase.created_at = now;
        purchase.updated_at = now;
        let warnings = commit_checks(&purchase);
        finalize(&mut purchase, today);

        inner.merchants.upsert(purchase.merchant.clone());
        inner.purchases.insert(0, purchase.clone());
        tracing::info!(id = %purchase.id, merchant = %purchase.merchant.name, "purchase created");
        log_warnings(&purchase.id, &warnings);
        Ok(Committed {
            value: purchase,
            warnings,
        })
    }

    /// Replaces merchant, line items, and the purchase-level warranty from the
    /// payload wholesale; merges scalar top-level fields; preserves
    /// attachments and `created_at`.
    pub fn update(&self, id: &str, raw: RawPurchase) -> CoreResult<Committed<Purchase>> {
        let now = Utc::now();
        let today = self.today();
        let mut inner = self.inner.write().expect("store lock poisoned");

        let index = position(&inner, id)?;
        let merged = merge_for_update(raw, &inner.purchases[index]);
        let mut purchase = normalize(merged, &inner.merchants, now)?;

        let existing = &inner.purchases[index];
        purchase.id = existing.id.clone();
        purchase.created_at = existing.created_at;
        purchase.attachments = existing.attachments.clone();
        purchase.updated_at = now;
        let warnings = commit_checks(&purchase);
        finalize(&mut purchase, today);

        inner.merchants.upsert(purchase.merchant.clone());
        inner.purchases[index] = purchase.clone();
        tracing::info!(id = %purchase.id, "purchase updated");
        log_warnings(&purchase.id, &warnings);
        Ok(Committed {
            value: purchase,
            warnings,
        })
    }

    /// Removes the purchase and everything nested under it.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let index = position(&inner, id)?;
        inner.purchases.remove(index);
        tracing::info!(id, "purchase deleted");
        Ok(())
    }

    pub fn get(&self, id: &str) -> CoreResult<Purchase> {
        let inner = self.inner.read().expect("store lock poisoned");
        let index = position(&inner, id)?;
        Ok(inner.purchases[index].clone())
    }

    /// Appends an attachment to the purchase. The simulated ingest delay runs
    /// before the lock is taken.
    pub fn add_attachment(&self, id: &str, file: &FileUpload) -> CoreResult<Attachment> {
        self.simulate_ingest();
        let now = Utc::now();
        let today = self.today();
        let mut inner = self.inner.write().expect("store lock poisoned");
        let index = position(&inner, id)?;

        let purchase = &mut inner.purchases[index];
        let attachment = Attachment::from_upload(id, file);
        purchase.attachments.push(attachment.clone());
        purchase.touch(now);
        finalize(purchase, today);
        tracing::debug!(id, filename = %attachment.filename, "attachment added");
        Ok(attachment)
    }

    /// Appends an attachment to one line item. An unknown line-item id gets a
    /// placeholder item synthesized for it; uploads are never lost.
    pub fn add_line_item_attachment(
        &self,
        id: &str,
        line_item_id: &str,
        file: &FileUpload,
    ) -> CoreResult<Attachment> {
        self.simulate_ingest();
        let now = Utc::now();
        let today = self.today();
        let mut inner = self.inner.write().expect("store lock poisoned");
        let index = position(&inner, id)?;

        let purchase = &mut inner.purchases[index];
        if purchase.line_item(line_item_id).is_none() {
            tracing::warn!(id, line_item_id, "unknown line item, synthesizing placeholder");
            purchase
                .line_items
                .push(LineItem::placeholder(line_item_id));
        }
        let attachment = Attachment::from_upload(&format!("{id}-{line_item_id}"), file);
        let item = purchase
            .line_item_mut(line_item_id)
            .expect("placeholder just inserted");
        item.attachments.push(attachment.clone());
        purchase.touch(now);
        finalize(purchase, today);
        tracing::debug!(id, line_item_id, "line-item attachment added");
        Ok(attachment)
    }

    /// Loads seed records, running each through the normalizer. Accepts a
    /// top-level JSON array or the fixture shape `{"receipts": [...]}`.
    /// Returns the number of records committed.
    pub fn seed_from_json(&self, json: &str) -> CoreResult<usize> {
        let records = parse_seed(json)?;
        let now = Utc::now();
        let today = self.today();
        let mut inner = self.inner.write().expect("store lock poisoned");

        // Validate every record before committing any of them.
        let mut normalized = Vec::with_capacity(records.len());
        for raw in records {
            normalized.push(normalize(raw, &inner.merchants, now)?);
        }
        let count = normalized.len();
        for mut purchase in normalized {
            purchase.id = next_id(&mut inner);
            finalize(&mut purchase, today);
            inner.merchants.upsert(purchase.merchant.clone());
            inner.purchases.insert(0, purchase);
        }
        tracing::info!(count, "seeded purchases");
        Ok(count)
    }

    /// Point-in-time snapshot for the query and aggregation engines. One lock
    /// acquisition; the engines then work lock-free on the copy.
    pub fn snapshot(&self) -> Vec<Purchase> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.purchases.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn merchant(&self, id: &str) -> Option<Merchant> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.merchants.get(id).cloned()
    }

    fn simulate_ingest(&self) {
        let delay = self.config.attachment_ingest_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

fn next_id(inner: &mut Inner) -> String {
    inner.id_counter += 1;
    format!("p{}", inner.id_counter)
}

fn position(inner: &Inner, id: &str) -> CoreResult<usize> {
    inner
        .purchases
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| CoreError::NotFound(format!("purchase {id}")))
}

fn finalize(purchase: &mut Purchase, today: NaiveDate) {
    let derived = derive_state(purchase, today);
    purchase.warranty_status = derived.warranty_status;
    purchase.search_blob = derived.search_blob;
}

/// Total-mismatch check: with integer cents, any nonzero difference exceeds
/// the half-minor-unit tolerance.
fn commit_checks(purchase: &Purchase) -> Vec<Warning> {
    let computed = purchase.amounts.computed_total_cents();
    let supplied = purchase.amounts.total_cents;
    if supplied != computed {
        vec![Warning::TotalMismatch {
            supplied_cents: supplied,
            computed_cents: computed,
        }]
    } else {
        Vec::new()
    }
}

fn log_warnings(id: &str, warnings: &[Warning]) {
    for warning in warnings {
        tracing::warn!(id, %warning, "write committed with warning");
    }
}

fn parse_seed(json: &str) -> CoreResult<Vec<RawPurchase>> {
    #[derive(Deserialize)]
    struct SeedFile {
        receipts: Vec<RawPurchase>,
    }
    if let Ok(records) = serde_json::from_str::<Vec<RawPurchase>>(json) {
        return Ok(records);
    }
    let file: SeedFile = serde_json::from_str(json)?;
    Ok(file.receipts)
}

use std::time::Duration;

use chrono::NaiveDate;
use receipt_core::core::services::{PurchaseService, QueryService};
use receipt_core::domain::WarrantyStatus;
use receipt_core::normalize::RawPurchase;
use receipt_core::query::{QuerySpec, SortOrder};
use receipt_core::store::{PurchaseStore, StoreConfig};

const TODAY: &str = "2024-06-01";

fn fixed_store() -> PurchaseStore {
    PurchaseStore::with_config(StoreConfig {
        attachment_ingest_delay: Duration::ZERO,
        today: Some(NaiveDate::parse_from_str(TODAY, "%Y-%m-%d").unwrap()),
    })
}

fn raw(json: &str) -> RawPurchase {
    serde_json::from_str(json).expect("payload parses")
}

fn create(store: &PurchaseStore, json: &str) {
    PurchaseService::create(store, raw(json)).expect("create");
}

/// 25 purchases: dates march through June 2024, totals climb by a dollar each,
/// even indexes are electronics with an in-warranty item, index 3 is expired.
fn populated_store() -> PurchaseStore {
    let store = fixed_store();
    for i in 0..25u32 {
        let day = i % 28 + 1;
        let category = if i % 2 == 0 { "electronics" } else { "kitchen" };
        let warranty = match i {
            0 | 2 | 4 => r#", "warranty": {"end_date": "2024-12-01"}"#,
            3 => r#", "warranty": {"end_date": "2024-01-01"}"#,
            _ => "",
        };
        create(
            &store,
            &format!(
                r#"{{
                    "merchant_name": "Shop {i}",
                    "purchase_date": "2024-05-{day:02}",
                    "total": {},
                    "line_items": [{{"name": "Item {i}", "quantity": 1, "unit_price": {}, "category": "{category}"{warranty}}}]
                }}"#,
                100 + i,
                100 + i,
            ),
        );
    }
    store
}

#[test]
fn pagination_clamps_to_available_records() {
    let store = populated_store();

    let page3 = QueryService::list(
        &store,
        &QuerySpec {
            page: 3,
            ..QuerySpec::default()
        },
    );
    assert_eq!(page3.total, 25);
    assert_eq!(page3.items.len(), 5);

    let page4 = QueryService::list(
        &store,
        &QuerySpec {
            page: 4,
            ..QuerySpec::default()
        },
    );
    assert_eq!(page4.total, 25);
    assert!(page4.items.is_empty(), "out-of-range pages are empty, not errors");
}

#[test]
fn default_sort_is_most_recent_first() {
    let store = populated_store();
    let page = QueryService::list(&store, &QuerySpec::default());
    for pair in page.items.windows(2) {
        assert!(pair[0].occurred_at >= pair[1].occurred_at);
    }
}

#[test]
fn amount_sorts_order_by_total_cents() {
    let store = populated_store();

    let asc = QueryService::list(
        &store,
        &QuerySpec {
            sort: SortOrder::TotalAsc,
            page_size: 25,
            ..QuerySpec::default()
        },
    );
    assert_eq!(asc.items.first().map(|s| s.total_cents), Some(10000));
    assert_eq!(asc.items.last().map(|s| s.total_cents), Some(12400));

    let desc = QueryService::list(
        &store,
        &QuerySpec {
            sort: SortOrder::TotalDesc,
            page_size: 25,
            ..QuerySpec::default()
        },
    );
    assert_eq!(desc.items.first().map(|s| s.total_cents), Some(12400));
}

#[test]
fn category_and_status_filters_compose() {
    let store = populated_store();

    let page = QueryService::list(
        &store,
        &QuerySpec {
            category_id: Some("electronics".into()),
            warranty_status: Some("in_warranty".into()),
            page_size: 25,
            ..QuerySpec::default()
        },
    );

    // only the even-index purchases with a live warranty: 0, 2, 4
    assert_eq!(page.total, 3);
    for item in &page.items {
        assert_eq!(item.warranty_status, WarrantyStatus::InWarranty);
        assert!(item.has_warranty_items);
    }
}

#[test]
fn all_disables_a_filter() {
    let store = populated_store();
    let page = QueryService::list(
        &store,
        &QuerySpec {
            category_id: Some("all".into()),
            warranty_status: Some("all".into()),
            page_size: 25,
            ..QuerySpec::default()
        },
    );
    assert_eq!(page.total, 25);
}

#[test]
fn category_match_is_case_insensitive() {
    let store = populated_store();
    let page = QueryService::list(
        &store,
        &QuerySpec {
            category_id: Some("Electronics".into()),
            page_size: 25,
            ..QuerySpec::default()
        },
    );
    assert_eq!(page.total, 13);
}

#[test]
fn text_filter_matches_the_search_blob() {
    let store = fixed_store();
    create(
        &store,
        r#"{
            "merchant_name": "Best Buy",
            "notes": "anniversary gift",
            "line_items": [{"name": "OLED TV", "quantity": 1, "unit_price": "499.99", "category": "electronics"}]
        }"#,
    );
    create(&store, r#"{"merchant_name": "Costco"}"#);

    let by_merchant = QueryService::list(
        &store,
        &QuerySpec {
            text: Some("best".into()),
            ..QuerySpec::default()
        },
    );
    assert_eq!(by_merchant.total, 1);
    assert_eq!(
        by_merchant.items[0].snippet.as_deref(),
        Some("Merchant match: Best Buy")
    );

    let by_item = QueryService::list(
        &store,
        &QuerySpec {
            text: Some("oled".into()),
            ..QuerySpec::default()
        },
    );
    assert_eq!(by_item.items[0].snippet.as_deref(), Some("Item match: OLED TV"));

    let by_notes = QueryService::list(
        &store,
        &QuerySpec {
            text: Some("anniversary".into()),
            ..QuerySpec::default()
        },
    );
    assert_eq!(
        by_notes.items[0].snippet.as_deref(),
        Some("Notes match: anniversary gift")
    );

    let nothing = QueryService::list(
        &store,
        &QuerySpec {
            text: Some("hovercraft".into()),
            ..QuerySpec::default()
        },
    );
    assert_eq!(nothing.total, 0);
}

#[test]
fn summaries_are_reduced_projections() {
    let store = fixed_store();
    create(&store, r#"{"merchant_name": "Best Buy", "total": "12.00"}"#);
    let page = QueryService::list(&store, &QuerySpec::default());

    let summary = &page.items[0];
    assert_eq!(summary.merchant_name, "Best Buy");
    assert_eq!(summary.total_cents, 1200);
    assert_eq!(summary.currency, "USD");
    assert!(summary.snippet.is_none(), "no text query, no snippet");
}

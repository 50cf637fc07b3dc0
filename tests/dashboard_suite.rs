use std::time::Duration;

use chrono::NaiveDate;
use receipt_core::core::services::{DashboardService, PurchaseService};
use receipt_core::normalize::RawPurchase;
use receipt_core::store::{PurchaseStore, StoreConfig};
use receipt_core::summary::ReportSpec;

fn fixed_store(today: &str) -> PurchaseStore {
    PurchaseStore::with_config(StoreConfig {
        attachment_ingest_delay: Duration::ZERO,
        today: Some(NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap()),
    })
}

fn raw(json: &str) -> RawPurchase {
    serde_json::from_str(json).expect("payload parses")
}

fn create(store: &PurchaseStore, json: &str) -> String {
    PurchaseService::create(store, raw(json)).expect("create").value.id
}

#[test]
fn totals_count_purchases_by_derived_status() {
    let store = fixed_store("2024-06-01");
    create(
        &store,
        r#"{"total": "10.00", "warranty": {"end_date": "2024-12-01"}}"#,
    );
    create(
        &store,
        r#"{"total": "20.00", "warranty": {"end_date": "2024-01-01"}}"#,
    );
    create(&store, r#"{"total": "30.00"}"#);

    let summary = DashboardService::summary(&store, &ReportSpec::default());
    assert_eq!(summary.totals.count, 3);
    assert_eq!(summary.totals.in_warranty, 1);
    assert_eq!(summary.totals.expired, 1);
    assert_eq!(summary.totals.unknown, 1);
    assert_eq!(summary.totals.sum_cents, 6000);
}

#[test]
fn expiry_window_is_inclusive_at_the_boundary() {
    // 2024-06-01 + 60 days lands exactly on 2024-07-31
    let store = fixed_store("2024-06-01");
    create(
        &store,
        r#"{"merchant_name": "Edge", "warranty": {"end_date": "2024-07-31"}}"#,
    );
    create(
        &store,
        r#"{"merchant_name": "Beyond", "warranty": {"end_date": "2024-08-01"}}"#,
    );
    create(
        &store,
        r#"{"merchant_name": "Past", "warranty": {"end_date": "2024-05-31"}}"#,
    );
    create(&store, r#"{"merchant_name": "Unbounded", "warranty": {}}"#);

    let summary = DashboardService::summary(&store, &ReportSpec::default());
    assert_eq!(summary.upcoming_expiries.len(), 1);
    let entry = &summary.upcoming_expiries[0];
    assert_eq!(entry.merchant_name, "Edge");
    assert_eq!(entry.days_left, 60);
}

#[test]
fn expiries_are_sorted_ascending_and_capped_at_six() {
    let store = fixed_store("2024-06-01");
    for day in 1..=8 {
        create(
            &store,
            &format!(r#"{{"warranty": {{"end_date": "2024-06-{:02}"}}}}"#, day + 1),
        );
    }

    let summary = DashboardService::summary(&store, &ReportSpec::default());
    assert_eq!(summary.upcoming_expiries.len(), 6);
    let days: Vec<i64> = summary.upcoming_expiries.iter().map(|e| e.days_left).collect();
    assert_eq!(days, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn item_level_expiries_name_their_line_item() {
    let store = fixed_store("2024-06-01");
    create(
        &store,
        r#"{
            "line_items": [
                {"id": "li1", "name": "Laptop", "quantity": 1, "unit_price": "999.00",
                 "warranty": {"end_date": "2024-06-15"}}
            ]
        }"#,
    );

    let summary = DashboardService::summary(&store, &ReportSpec::default());
    assert_eq!(summary.upcoming_expiries.len(), 1);
    assert_eq!(
        summary.upcoming_expiries[0].line_item_name.as_deref(),
        Some("Laptop")
    );
    assert_eq!(summary.upcoming_expiries[0].days_left, 14);
}

#[test]
fn by_category_groups_one_month_of_line_items() {
    let store = fixed_store("2024-06-01");
    create(
        &store,
        r#"{
            "purchase_date": "2024-03-05",
            "line_items": [
                {"name": "TV", "quantity": 1, "unit_price": "400.00", "category": "electronics"},
                {"name": "Soundbar", "quantity": 1, "unit_price": "100.00", "category": "electronics"},
                {"name": "Pan", "quantity": 1, "unit_price": "30.00", "category": "kitchen"}
            ]
        }"#,
    );
    create(
        &store,
        r#"{
            "purchase_date": "2024-03-20",
            "line_items": [{"name": "Mystery", "quantity": 1, "unit_price": "55.00"}]
        }"#,
    );
    create(
        &store,
        r#"{
            "purchase_date": "2024-04-02",
            "line_items": [{"name": "Out of window", "quantity": 1, "unit_price": "999.00", "category": "electronics"}]
        }"#,
    );

    let summary = DashboardService::summary(
        &store,
        &ReportSpec {
            month: Some("2024-03".into()),
            ..ReportSpec::default()
        },
    );

    let by_category = &summary.by_category;
    assert_eq!(by_category.len(), 3);
    assert_eq!(by_category[0].category_id, "electronics");
    assert_eq!(by_category[0].spend, 500.0);
    assert_eq!(by_category[0].item_count, 2);
    assert_eq!(by_category[1].category_id, "uncategorized");
    assert_eq!(by_category[1].spend, 55.0);
    assert_eq!(by_category[2].category_id, "kitchen");
    assert_eq!(by_category[2].spend, 30.0);
}

#[test]
fn recent_respects_limit_and_ordering() {
    let store = fixed_store("2024-06-01");
    for day in 1..=7 {
        create(
            &store,
            &format!(
                r#"{{"merchant_name": "Shop {day}", "purchase_date": "2024-05-{day:02}", "product_name": "Thing {day}"}}"#
            ),
        );
    }

    let summary = DashboardService::summary(&store, &ReportSpec::default());
    assert_eq!(summary.recent.len(), 5);
    assert_eq!(summary.recent[0].merchant_name, "Shop 7");
    assert_eq!(summary.recent[4].merchant_name, "Shop 3");
    assert_eq!(summary.recent[0].first_line_item.as_deref(), Some("Thing 7"));

    let limited = DashboardService::summary(
        &store,
        &ReportSpec {
            recent_limit: 2,
            ..ReportSpec::default()
        },
    );
    assert_eq!(limited.recent.len(), 2);
}

#[test]
fn custom_expiry_window_narrows_the_report() {
    let store = fixed_store("2024-06-01");
    create(&store, r#"{"warranty": {"end_date": "2024-06-20"}}"#);
    create(&store, r#"{"warranty": {"end_date": "2024-07-20"}}"#);

    let summary = DashboardService::summary(
        &store,
        &ReportSpec {
            expiring_window_days: 30,
            ..ReportSpec::default()
        },
    );
    assert_eq!(summary.upcoming_expiries.len(), 1);
    assert_eq!(summary.upcoming_expiries[0].days_left, 19);
}

#[test]
fn delete_removes_a_purchase_from_every_aggregation() {
    let store = fixed_store("2024-06-01");
    let keep = create(
        &store,
        r#"{
            "merchant_name": "Keeper",
            "purchase_date": "2024-06-01",
            "line_items": [{"name": "Kept", "quantity": 1, "unit_price": "10.00", "category": "kitchen"}]
        }"#,
    );
    let doomed = create(
        &store,
        r#"{
            "merchant_name": "Doomed",
            "purchase_date": "2024-06-02",
            "line_items": [{"name": "Gone", "quantity": 1, "unit_price": "99.00", "category": "electronics",
                            "warranty": {"end_date": "2024-06-30"}}]
        }"#,
    );

    PurchaseService::delete(&store, &doomed).expect("delete");

    assert!(PurchaseService::get(&store, &doomed).is_err());
    let summary = DashboardService::summary(
        &store,
        &ReportSpec {
            month: Some("2024-06".into()),
            ..ReportSpec::default()
        },
    );
    assert_eq!(summary.totals.count, 1);
    assert!(summary.upcoming_expiries.is_empty());
    assert_eq!(summary.by_category.len(), 1);
    assert_eq!(summary.by_category[0].category_id, "kitchen");
    assert_eq!(summary.recent.len(), 1);
    assert_eq!(summary.recent[0].id, keep);
}

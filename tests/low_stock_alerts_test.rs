mod common;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::TestApp;
use stockguard_api::{
    errors::ServiceError,
    services::{low_stock::LowStockReport, sales_activity::SalesWindow},
};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap()
}

fn days_ago(days: i64) -> DateTime<Utc> {
    as_of() - Duration::days(days)
}

async fn alerts(app: &TestApp, company_id: i32, window_days: u32) -> Result<LowStockReport, ServiceError> {
    app.state
        .low_stock_service
        .alerts_as_of(company_id, SalesWindow::days(window_days).unwrap(), as_of())
        .await
}

/// Company with two warehouses and a product type whose threshold is 10
struct Fixture {
    app: TestApp,
    company_id: i32,
    main_wh: i32,
    overflow_wh: i32,
    type_id: i32,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let main_wh = app.seed_warehouse(company.id, "Main").await;
    let overflow_wh = app.seed_warehouse(company.id, "Overflow").await;
    let product_type = app.seed_product_type(company.id, 10).await;

    Fixture {
        company_id: company.id,
        main_wh: main_wh.id,
        overflow_wh: overflow_wh.id,
        type_id: product_type.id,
        app,
    }
}

#[tokio::test]
async fn worked_example_alerts_with_two_days_left() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "WID-1", Some(f.type_id), f.main_wh, 4).await;
    f.app.seed_sale(f.company_id, days_ago(3), &[(created.product.id, 60)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();

    assert_eq!(report.window_days, 30);
    assert_eq!(report.findings.len(), 1);
    let alert = &report.findings[0];
    assert_eq!(alert.product_id, created.product.id);
    assert_eq!(alert.warehouse_id, f.main_wh);
    assert_eq!(alert.current_stock, 4);
    assert_eq!(alert.threshold, 10);
    assert_eq!(alert.recent_sales, 60);
    assert_eq!(alert.avg_daily_sales, 2.0);
    assert_eq!(alert.days_until_stockout, Some(2));
}

#[tokio::test]
async fn product_without_recent_sales_is_never_alerted() {
    let f = fixture().await;
    let stale = f.app.create_product(f.company_id, "STALE-1", Some(f.type_id), f.main_wh, 0).await;
    // outside the window
    f.app.seed_sale(f.company_id, days_ago(45), &[(stale.product.id, 100)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    assert!(report.findings.is_empty());
}

#[tokio::test]
async fn stock_at_or_above_threshold_is_not_alerted() {
    let f = fixture().await;
    let at = f.app.create_product(f.company_id, "AT-1", Some(f.type_id), f.main_wh, 10).await;
    let above = f.app.create_product(f.company_id, "ABOVE-1", Some(f.type_id), f.main_wh, 25).await;
    f.app
        .seed_sale(f.company_id, days_ago(1), &[(at.product.id, 5), (above.product.id, 5)])
        .await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    assert!(report.findings.is_empty());
}

#[tokio::test]
async fn product_without_type_has_no_threshold_and_is_excluded() {
    let f = fixture().await;
    let untyped = f.app.create_product(f.company_id, "UNTYPED-1", None, f.main_wh, 0).await;
    f.app.seed_sale(f.company_id, days_ago(1), &[(untyped.product.id, 9)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    assert!(report.findings.is_empty());
}

#[tokio::test]
async fn missing_supplier_yields_null_supplier_not_exclusion() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "NOSUP-1", Some(f.type_id), f.main_wh, 2).await;
    f.app.seed_sale(f.company_id, days_ago(2), &[(created.product.id, 30)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    assert_eq!(report.findings.len(), 1);
    assert!(report.findings[0].supplier.is_none());
}

#[tokio::test]
async fn several_suppliers_report_the_lowest_id_once() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "SUP-1", Some(f.type_id), f.main_wh, 2).await;
    let first = f.app.seed_supplier("First Supply", Some("orders@first.test")).await;
    let second = f.app.seed_supplier("Second Supply", None).await;
    f.app.link_supplier(created.product.id, second.id).await;
    f.app.link_supplier(created.product.id, first.id).await;
    f.app.seed_sale(f.company_id, days_ago(2), &[(created.product.id, 30)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();

    assert_eq!(report.findings.len(), 1);
    let supplier = report.findings[0].supplier.as_ref().unwrap();
    assert_eq!(supplier.id, first.id);
    assert_eq!(supplier.name, "First Supply");
    assert_eq!(supplier.contact_email.as_deref(), Some("orders@first.test"));
}

#[tokio::test]
async fn each_low_warehouse_surfaces_independently() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "MULTI-1", Some(f.type_id), f.main_wh, 3).await;
    f.app.stock_in(created.product.id, f.overflow_wh, 50).await;
    f.app.seed_sale(f.company_id, days_ago(5), &[(created.product.id, 15)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].warehouse_id, f.main_wh);
    // 15 sold over 30 days => 0.5/day; 3 units last 6 days
    assert_eq!(report.findings[0].days_until_stockout, Some(6));

    f.app.stock_in(created.product.id, f.app.seed_warehouse(f.company_id, "Third").await.id, 1).await;
    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    let warehouses: Vec<i32> = report.findings.iter().map(|a| a.warehouse_id).collect();
    assert_eq!(warehouses.len(), 2);
    assert!(warehouses.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn window_includes_cutoff_instant_and_excludes_older_orders() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "EDGE-1", Some(f.type_id), f.main_wh, 1).await;
    let cutoff = days_ago(30);
    f.app.seed_sale(f.company_id, cutoff, &[(created.product.id, 30)]).await;
    f.app
        .seed_sale(f.company_id, cutoff - Duration::seconds(1), &[(created.product.id, 1_000)])
        .await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].recent_sales, 30);
}

#[tokio::test]
async fn duplicate_sale_rows_are_summed() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "SUM-1", Some(f.type_id), f.main_wh, 4).await;
    f.app.seed_sale(f.company_id, days_ago(1), &[(created.product.id, 20)]).await;
    f.app.seed_sale(f.company_id, days_ago(1), &[(created.product.id, 20)]).await;
    f.app
        .seed_sale(f.company_id, days_ago(10), &[(created.product.id, 10), (created.product.id, 10)])
        .await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();

    assert_eq!(report.findings[0].recent_sales, 60);
    assert_eq!(report.findings[0].days_until_stockout, Some(2));
}

#[tokio::test]
async fn other_companies_sales_do_not_count() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "MINE-1", Some(f.type_id), f.main_wh, 1).await;
    let other = f.app.seed_company("Globex").await;
    f.app.seed_sale(other.id, days_ago(1), &[(created.product.id, 50)]).await;

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    assert!(report.findings.is_empty());
}

#[tokio::test]
async fn shorter_window_changes_rate_and_projection() {
    let f = fixture().await;
    let created = f.app.create_product(f.company_id, "WEEK-1", Some(f.type_id), f.main_wh, 7).await;
    f.app.seed_sale(f.company_id, days_ago(2), &[(created.product.id, 14)]).await;
    f.app.seed_sale(f.company_id, days_ago(20), &[(created.product.id, 100)]).await;

    let report = alerts(&f.app, f.company_id, 7).await.unwrap();

    assert_eq!(report.window_days, 7);
    let alert = &report.findings[0];
    assert_eq!(alert.recent_sales, 14);
    assert_eq!(alert.avg_daily_sales, 2.0);
    assert_eq!(alert.days_until_stockout, Some(3));
}

#[tokio::test]
async fn unknown_company_is_not_found_while_known_company_may_be_empty() {
    let f = fixture().await;

    assert_matches!(alerts(&f.app, 9_999, 30).await, Err(ServiceError::NotFound(_)));

    let report = alerts(&f.app, f.company_id, 30).await.unwrap();
    assert!(report.findings.is_empty());
}

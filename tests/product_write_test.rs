mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use stockguard_api::{
    entities::{
        inventory,
        inventory_movement::{self, MovementKind},
    },
    errors::ServiceError,
    services::products::CreateProductCommand,
};

fn command(company_id: i32, sku: &str, warehouse_id: i32, quantity: i32) -> CreateProductCommand {
    CreateProductCommand {
        company_id,
        sku: sku.to_string(),
        name: "Widget".to_string(),
        price: Decimal::new(1999, 2),
        product_type_id: None,
        warehouse_id,
        initial_quantity: quantity,
    }
}

#[tokio::test]
async fn create_writes_one_product_and_one_linked_inventory_row() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;

    let created = app
        .state
        .product_service
        .create_product_with_stock(command(company.id, "WID-001", warehouse.id, 40))
        .await
        .unwrap();

    assert_eq!(created.product.sku, "WID-001");
    assert_eq!(created.inventory.product_id, created.product.id);
    assert_eq!(created.inventory.warehouse_id, warehouse.id);
    assert_eq!(created.inventory.quantity, 40);
    assert_eq!(app.count_products().await, 1);
    assert_eq!(app.count_inventory().await, 1);

    let stored = inventory::Entity::find()
        .filter(inventory::Column::ProductId.eq(created.product.id))
        .all(app.db())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].warehouse_id, warehouse.id);
}

#[tokio::test]
async fn create_appends_opening_ledger_entry() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;

    let created = app.create_product(company.id, "WID-002", None, warehouse.id, 12).await;

    let movements = inventory_movement::Entity::find()
        .filter(inventory_movement::Column::InventoryId.eq(created.inventory.id))
        .all(app.db())
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].kind, MovementKind::Initial);
    assert_eq!(movements[0].quantity_delta, 12);
    assert_eq!(movements[0].quantity_after, 12);
}

#[tokio::test]
async fn failure_at_inventory_insert_leaves_no_ghost_product() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;

    let result = app
        .state
        .product_service
        .create_product_with_stock(command(company.id, "GHOST-1", 9_999, 5))
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(msg)) if msg.contains("warehouse 9999"));
    assert_eq!(app.count_products().await, 0);
    assert_eq!(app.count_inventory().await, 0);
    assert_eq!(app.count_movements().await, 0);
}

#[tokio::test]
async fn unknown_company_is_not_found_and_writes_nothing() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;

    let result = app
        .state
        .product_service
        .create_product_with_stock(command(4_242, "ORPHAN-1", warehouse.id, 5))
        .await;

    assert_matches!(result, Err(ServiceError::NotFound(_)));
    assert_eq!(app.count_products().await, 0);
    assert_eq!(app.count_inventory().await, 0);
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict_and_keeps_one_row() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;

    app.create_product(company.id, "DUP-1", None, warehouse.id, 3).await;

    let second = app
        .state
        .product_service
        .create_product_with_stock(command(company.id, "DUP-1", warehouse.id, 7))
        .await;

    assert_matches!(second, Err(ServiceError::Conflict(msg)) if msg.contains("DUP-1"));
    assert_eq!(app.count_products_with_sku("DUP-1").await, 1);
    assert_eq!(app.count_inventory().await, 1);
}

#[tokio::test]
async fn sku_is_unique_across_companies() {
    let app = TestApp::new().await;
    let first = app.seed_company("Acme").await;
    let second = app.seed_company("Globex").await;
    let first_wh = app.seed_warehouse(first.id, "A").await;
    let second_wh = app.seed_warehouse(second.id, "B").await;

    app.create_product(first.id, "SHARED-1", None, first_wh.id, 1).await;
    let result = app
        .state
        .product_service
        .create_product_with_stock(command(second.id, "SHARED-1", second_wh.id, 1))
        .await;

    assert_matches!(result, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn racing_creates_for_one_sku_yield_exactly_one_success() {
    let app = TestApp::new().await;
    let company = app.seed_company("Acme").await;
    let warehouse = app.seed_warehouse(company.id, "Main").await;
    let service = app.state.product_service.clone();

    let (a, b) = tokio::join!(
        service.create_product_with_stock(command(company.id, "RACE-1", warehouse.id, 1)),
        service.create_product_with_stock(command(company.id, "RACE-1", warehouse.id, 2)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    let failure = if a.is_err() { a } else { b };
    assert_matches!(failure, Err(ServiceError::Conflict(_)));
    assert_eq!(app.count_products_with_sku("RACE-1").await, 1);
    assert_eq!(app.count_inventory().await, 1);
}

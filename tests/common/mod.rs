#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::Value;
use stockguard_api::{
    config::AppConfig,
    db::{self, DbPool},
    entities::{
        company, inventory, inventory_movement, product, product_supplier, product_type,
        sales_order, sales_order_item, supplier, warehouse,
    },
    services::products::{CreateProductCommand, ProductWithStock},
    AppState,
};
use tower::ServiceExt;

/// Application state and router over a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        // every connection to sqlite::memory: would otherwise see its own database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = stockguard_api::app_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &DbPool {
        &self.state.db
    }

    /// Send a request against the router
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request and decode the JSON response body
    pub async fn request_json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not json")
        };
        (status, value)
    }

    pub async fn seed_company(&self, name: &str) -> company::Model {
        company::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed company")
    }

    pub async fn seed_warehouse(&self, company_id: i32, name: &str) -> warehouse::Model {
        warehouse::ActiveModel {
            company_id: Set(company_id),
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed warehouse")
    }

    pub async fn seed_product_type(&self, company_id: i32, threshold: i32) -> product_type::Model {
        product_type::ActiveModel {
            company_id: Set(company_id),
            name: Set(format!("type-{threshold}")),
            low_stock_threshold: Set(threshold),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed product type")
    }

    pub async fn seed_supplier(&self, name: &str, contact_email: Option<&str>) -> supplier::Model {
        supplier::ActiveModel {
            name: Set(name.to_string()),
            contact_email: Set(contact_email.map(str::to_string)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed supplier")
    }

    pub async fn link_supplier(&self, product_id: i32, supplier_id: i32) {
        product_supplier::Entity::insert(product_supplier::ActiveModel {
            product_id: Set(product_id),
            supplier_id: Set(supplier_id),
        })
        .exec_without_returning(self.db())
        .await
        .expect("link supplier");
    }

    /// Creates a product with stock through the service under test
    pub async fn create_product(
        &self,
        company_id: i32,
        sku: &str,
        product_type_id: Option<i32>,
        warehouse_id: i32,
        quantity: i32,
    ) -> ProductWithStock {
        self.state
            .product_service
            .create_product_with_stock(CreateProductCommand {
                company_id,
                sku: sku.to_string(),
                name: format!("Product {sku}"),
                price: Decimal::new(1999, 2),
                product_type_id,
                warehouse_id,
                initial_quantity: quantity,
            })
            .await
            .expect("create product")
    }

    /// Adds an inventory row for an existing product in another warehouse
    pub async fn stock_in(&self, product_id: i32, warehouse_id: i32, quantity: i32) -> inventory::Model {
        inventory::ActiveModel {
            product_id: Set(product_id),
            warehouse_id: Set(warehouse_id),
            quantity: Set(quantity),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed inventory")
    }

    /// Records one order with one line per `(product_id, quantity)`
    pub async fn seed_sale(&self, company_id: i32, created_at: DateTime<Utc>, lines: &[(i32, i32)]) {
        let order = sales_order::ActiveModel {
            company_id: Set(company_id),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed sales order");

        for (product_id, quantity) in lines {
            sales_order_item::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(*product_id),
                quantity: Set(*quantity),
                price_at_sale: Set(Decimal::new(1999, 2)),
                ..Default::default()
            }
            .insert(self.db())
            .await
            .expect("seed sales order item");
        }
    }

    pub async fn count_products_with_sku(&self, sku: &str) -> u64 {
        product::Entity::find()
            .filter(product::Column::Sku.eq(sku))
            .count(self.db())
            .await
            .expect("count products")
    }

    pub async fn count_products(&self) -> u64 {
        product::Entity::find().count(self.db()).await.expect("count products")
    }

    pub async fn count_inventory(&self) -> u64 {
        inventory::Entity::find().count(self.db()).await.expect("count inventory")
    }

    pub async fn count_movements(&self) -> u64 {
        inventory_movement::Entity::find()
            .count(self.db())
            .await
            .expect("count movements")
    }
}

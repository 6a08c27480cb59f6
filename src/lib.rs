//! Stockguard API library
//!
//! Multi-warehouse stock tracking: atomic product onboarding, an append-only
//! stock movement ledger and low-stock alerting with stockout projections.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::db::DbPool;
use crate::services::{
    inventory::InventoryService, low_stock::LowStockService, products::ProductService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub product_service: ProductService,
    pub inventory_service: InventoryService,
    pub low_stock_service: LowStockService,
}

impl AppState {
    /// Wires every service onto one shared pool
    pub fn new(db: Arc<DbPool>, config: config::AppConfig) -> Self {
        Self {
            product_service: ProductService::new(db.clone()),
            inventory_service: InventoryService::new(db.clone()),
            low_stock_service: LowStockService::new(db.clone(), &config),
            db,
            config,
        }
    }
}

/// Routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(handlers::products::create_product))
        .route(
            "/companies/:company_id/alerts/low-stock",
            get(handlers::alerts::low_stock_alerts),
        )
        .route(
            "/inventory/movements",
            post(handlers::inventory::record_movement),
        )
        .route(
            "/inventory/:inventory_id/movements",
            get(handlers::inventory::list_movements),
        )
}

/// Full application router with request ids and HTTP tracing applied.
///
/// CORS is left to the binary since it depends on deployment settings.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "stockguard-api up" }))
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::openapi_routes())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

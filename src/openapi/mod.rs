use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockguard API",
        version = "0.1.0",
        description = r#"
Multi-warehouse stock tracking.

- **Products**: create a product and its opening stock atomically
- **Inventory movements**: restock, sale and adjustment entries on an append-only ledger
- **Low-stock alerts**: per-warehouse threshold checks for products with recent sales, with a days-until-stockout projection
"#
    ),
    paths(
        crate::handlers::products::create_product,
        crate::handlers::alerts::low_stock_alerts,
        crate::handlers::inventory::record_movement,
        crate::handlers::inventory::list_movements,
        crate::health::health_check,
    ),
    components(
        schemas(
            crate::dto::products::CreateProductRequest,
            crate::dto::products::CreatedProductResponse,
            crate::dto::alerts::LowStockAlert,
            crate::dto::alerts::LowStockAlertsResponse,
            crate::dto::alerts::SupplierInfo,
            crate::dto::inventory::RecordMovementRequest,
            crate::dto::inventory::RecordedMovementResponse,
            crate::dto::inventory::MovementEntry,
            crate::dto::inventory::MovementHistoryResponse,
            crate::entities::inventory_movement::MovementKind,
            crate::health::HealthResponse,
            crate::health::HealthStatus,
            crate::errors::ErrorResponse,
        )
    ),
    tags(
        (name = "products", description = "Catalog onboarding"),
        (name = "inventory", description = "Stock movements"),
        (name = "alerts", description = "Low-stock alerting"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document at `/api-docs/openapi.json`
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

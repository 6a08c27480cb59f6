use super::common::{created_response, json_body};
use crate::{
    dto::products::{CreateProductRequest, CreatedProductResponse},
    errors::ServiceError,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Create a product together with its initial stock in one warehouse
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product and inventory created", body = CreatedProductResponse,
            headers(("X-Request-Id" = String, description = "Unique request id for tracing"))
        ),
        (status = 400, description = "Missing or malformed field", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company, warehouse or product type not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let payload = json_body(payload)?;
    let request = CreateProductRequest::parse(&payload)?;

    let created = state
        .product_service
        .create_product_with_stock(request.into())
        .await?;

    Ok(created_response(CreatedProductResponse::from(created)))
}

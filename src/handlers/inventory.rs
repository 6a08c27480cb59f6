use super::common::{created_response, json_body, path_param, success_response};
use crate::{
    dto::inventory::{
        MovementEntry, MovementHistoryResponse, RecordMovementRequest, RecordedMovementResponse,
    },
    errors::ServiceError,
    AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Record a restock, sale or adjustment against an inventory row
#[utoipa::path(
    post,
    path = "/api/v1/inventory/movements",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Movement recorded", body = RecordedMovementResponse),
        (status = 400, description = "Missing or malformed field", body = crate::errors::ErrorResponse),
        (status = 404, description = "No inventory for product and warehouse", body = crate::errors::ErrorResponse),
        (status = 409, description = "Inventory changed concurrently", body = crate::errors::ErrorResponse),
        (status = 422, description = "Stock would become negative", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn record_movement(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let payload = json_body(payload)?;
    let request = RecordMovementRequest::parse(&payload)?;

    let recorded = state.inventory_service.record_movement(request.into()).await?;

    Ok(created_response(RecordedMovementResponse::from(recorded)))
}

/// Ledger of an inventory row, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{inventory_id}/movements",
    params(("inventory_id" = i32, Path, description = "Inventory row id")),
    responses(
        (status = 200, description = "Movement history", body = MovementHistoryResponse),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    inventory_id: Result<Path<i32>, PathRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let inventory_id = path_param(inventory_id, "inventory_id", "an integer")?;

    let movements = state.inventory_service.list_movements(inventory_id).await?;

    Ok(success_response(MovementHistoryResponse {
        inventory_id,
        movements: movements.into_iter().map(MovementEntry::from).collect(),
    }))
}

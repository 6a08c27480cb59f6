use super::common::{path_param, query_params, success_response};
use crate::{
    dto::alerts::{LowStockAlertsQuery, LowStockAlertsResponse},
    errors::ServiceError,
    AppState,
};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::IntoResponse,
};

/// Low-stock alerts for a company's products with recent sales
#[utoipa::path(
    get,
    path = "/api/v1/companies/{company_id}/alerts/low-stock",
    params(
        ("company_id" = i32, Path, description = "Company id"),
        LowStockAlertsQuery
    ),
    responses(
        (status = 200, description = "Alerts computed; the list may be empty", body = LowStockAlertsResponse),
        (status = 400, description = "Invalid company id or window", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    company_id: Result<Path<i32>, PathRejection>,
    query: Result<Query<LowStockAlertsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let company_id = path_param(company_id, "company_id", "an integer")?;
    let query = query_params(query, "window_days", "a positive integer")?;

    let report = state
        .low_stock_service
        .alerts_for_company(company_id, query.window_days)
        .await?;

    Ok(success_response(LowStockAlertsResponse::from(report)))
}

use crate::errors::ServiceError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Unwraps a JSON body, turning extractor rejections into the API error shape
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ServiceError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))
}

pub fn path_param<T>(
    param: Result<axum::extract::Path<T>, PathRejection>,
    name: &str,
    expected: &str,
) -> Result<T, ServiceError> {
    param
        .map(|axum::extract::Path(value)| value)
        .map_err(|_| ServiceError::invalid_field(name, expected))
}

pub fn query_params<T>(
    query: Result<axum::extract::Query<T>, QueryRejection>,
    name: &str,
    expected: &str,
) -> Result<T, ServiceError> {
    query
        .map(|axum::extract::Query(value)| value)
        .map_err(|_| ServiceError::invalid_field(name, expected))
}

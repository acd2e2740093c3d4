use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pharmatrack_core::DomainError;
use pharmatrack_inventory::InventoryError;

pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        InventoryError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        InventoryError::DuplicateSku(_) => json_error(StatusCode::BAD_REQUEST, "duplicate_sku", message),
        InventoryError::DuplicateInBatch(_) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_in_batch", message)
        }
        InventoryError::SkusAlreadyExist(_) => {
            json_error(StatusCode::BAD_REQUEST, "skus_already_exist", message)
        }
        InventoryError::EmptyBatch => json_error(StatusCode::BAD_REQUEST, "empty_batch", message),
        InventoryError::InvalidDate(_) => json_error(StatusCode::BAD_REQUEST, "invalid_date", message),
        InventoryError::ExpiredDate(_) => json_error(StatusCode::BAD_REQUEST, "expired_date", message),
        InventoryError::ConstraintViolation(_) => {
            json_error(StatusCode::CONFLICT, "constraint_violation", message)
        }
        InventoryError::Store(e) => {
            tracing::error!(error = %e, "drug store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn invalid_id(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
}

pub fn invalid_pagination(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_pagination", message)
}

/// 422 with one message per invalid field.
pub fn validation_failed(detail: Vec<String>) -> axum::response::Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        axum::Json(json!({
            "error": "validation_error",
            "detail": detail,
        })),
    )
        .into_response()
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation_error",
        rejection.body_text(),
    )
}

pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    json_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation_error",
        rejection.body_text(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

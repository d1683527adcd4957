//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The request refers to something that does not exist.
    Unprocessable(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Order(OrderError::ItemNotFound { .. }) => StatusCode::NOT_FOUND,
        DomainError::Order(_) | DomainError::Customer(_) | DomainError::Product(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Store(store_err) => match store_err {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::DuplicateKey { .. } => StatusCode::CONFLICT,
            StoreError::ForeignKeyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Database(_) | StoreError::Migration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        DomainError::Dispatch(_) | DomainError::CorruptRow { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "internal server error");
    }
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use common::OrderItemId;
    use domain::CustomerError;

    use super::*;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (
                DomainError::NotFound {
                    entity: "Order",
                    id: "o1".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::Order(OrderError::ItemNotFound {
                    item_id: OrderItemId::new("9"),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::Customer(CustomerError::NameRequired),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::Store(StoreError::DuplicateKey {
                    table: "orders",
                    key: "o1".to_string(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Store(StoreError::ForeignKeyViolation {
                    table: "orders",
                    detail: "customer c9 does not exist".to_string(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::CorruptRow {
                    entity: "Order",
                    id: "o1".to_string(),
                    reason: "no items".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(status_for(&err), expected, "{err}");
        }
    }
}

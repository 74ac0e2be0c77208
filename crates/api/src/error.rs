//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_store::CartStoreError;
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Domain or storage error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::CartNotFound(_) => StatusCode::NOT_FOUND,
        // A row changed under a stale aggregate.
        DomainError::Store(CartStoreError::ItemNotFound { .. }) => StatusCode::CONFLICT,
        DomainError::Store(CartStoreError::DuplicateCart(_))
        | DomainError::Store(CartStoreError::DuplicateItem { .. }) => StatusCode::CONFLICT,
        DomainError::Store(CartStoreError::CartNotFound(_)) => StatusCode::NOT_FOUND,
        DomainError::QuantityOutOfRange { .. }
        | DomainError::Store(CartStoreError::QuantityOutOfRange { .. }) => StatusCode::BAD_REQUEST,
        DomainError::Store(_) => {
            tracing::error!(error = %err, "internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

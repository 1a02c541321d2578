//! Product catalog API error types.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_core::error::{DomainError, FieldViolation};
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Per-field detail for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldViolation>>,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the domain or its repositories.
    Domain(DomainError),
    /// A path segment that cannot name any product.
    UnknownProduct(String),
    /// A request body that is absent or not the expected JSON.
    MalformedBody(JsonRejection),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::UnknownProduct(raw) => {
                let body = ErrorBody {
                    error: "not_found",
                    message: format!("product not found: {raw}"),
                    fields: None,
                };
                return (StatusCode::NOT_FOUND, Json(body)).into_response();
            }
            Self::MalformedBody(rejection) => {
                let body = ErrorBody {
                    error: "validation_error",
                    message: rejection.body_text(),
                    fields: None,
                };
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            Self::Domain(err) => err,
        };

        let (status, error_code) = match &err {
            DomainError::AggregateNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::IllegalState { .. } => {
                (StatusCode::CONFLICT, "illegal_lifecycle_state")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }

        let violations = err.violations();
        let body = ErrorBody {
            error: error_code,
            message: err.to_string(),
            fields: (!violations.is_empty()).then(|| violations.to_vec()),
        };

        (status, Json(body)).into_response()
    }
}

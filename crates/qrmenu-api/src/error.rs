//! QR menu API error types.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use qrmenu_core::error::{DomainError, FieldError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migrations could not be applied.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The tracing subscriber or span exporter could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Per-field failures, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

/// Malformed or mistyped request bodies are reported like any other field
/// validation failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&rejection.body_text()),
            _ => "body".to_owned(),
        };
        Self(DomainError::invalid_field(field, rejection.body_text()))
    }
}

/// Picks the offending field out of a body deserialization message such as
/// `...target type: price: invalid type: string "abc", expected f64 ...` or
/// `...target type: missing field `name` ...`.
fn rejected_field(text: &str) -> String {
    let detail = text.split_once(": ").map_or(text, |(_, detail)| detail);
    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((name, _)) = rest.split_once('`') {
            return name.to_owned();
        }
    }
    match detail.split_once(": ") {
        Some((path, _)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            path.to_owned()
        }
        _ => "body".to_owned(),
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::AggregateNotFound(_) => (StatusCode::NOT_FOUND, "menu_not_found"),
            DomainError::MenuItemNotFound { .. } => (StatusCode::NOT_FOUND, "menu_item_not_found"),
            DomainError::TokenNotFound(_) => (StatusCode::NOT_FOUND, "public_token_not_found"),
            DomainError::ArtifactNotFound(_) => (StatusCode::NOT_FOUND, "qr_artifact_not_found"),
            DomainError::VersionNotFound { .. } => (StatusCode::NOT_FOUND, "version_not_found"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::TokenConflict(_) => (StatusCode::CONFLICT, "public_token_conflict"),
            DomainError::UnsupportedCombination(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unsupported_combination")
            }
            DomainError::AllocationExhausted { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "allocation_exhausted")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self.0, code = error_code, "request failed");
        }

        let fields = match &self.0 {
            DomainError::Validation(errors) => Some(errors.fields().to_vec()),
            _ => None,
        };
        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}

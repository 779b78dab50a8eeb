//! Custom error types with proper HTTP status code mappings.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// API error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Domain errors with HTTP status code mappings
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Shape, range, or invariant violation (422 Unprocessable Entity)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Multiple validation errors (422 Unprocessable Entity)
    #[error("Validation failed")]
    ValidationErrors(Vec<String>),

    /// Metrics batch referenced a variant the experiment does not have
    /// (400 Bad Request)
    #[error("Variant '{0}' not found in experiment")]
    UnknownVariant(String),

    /// Resource not found (404 Not Found)
    #[error("{0} not found")]
    NotFound(String),

    /// Duplicate experiment name (409 Conflict)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded (429 Too Many Requests)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Warehouse connection or query error (500 Internal Server Error)
    #[error("Database error")]
    Database(String),

    /// Internal server error (500 Internal Server Error)
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) | DomainError::ValidationErrors(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::UnknownVariant(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            DomainError::Internal(_) | DomainError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Collapse validator output into one message per offending field.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let reason = error
                    .message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("failed the '{}' check", error.code));
                details.push(format!("{field}: {reason}"));
            }
        }

        if details.is_empty() {
            DomainError::Validation("Invalid request body".to_string())
        } else {
            DomainError::ValidationErrors(details)
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        let (error, details) = match self {
            DomainError::ValidationErrors(messages) => {
                ("Validation failed".to_string(), Some(messages))
            }
            other => (other.to_string(), None),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

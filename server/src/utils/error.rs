use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::event::MenuSelectionError;
use crate::provider::ProviderError;
use crate::utils::response::failure;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Payment provider error")]
    ProviderError(#[from] ProviderError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl From<MenuSelectionError> for AppError {
    fn from(err: MenuSelectionError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::AuthError(_) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::ProviderError(_) => (StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR"),
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        }
    }

    /// The caller's own mistake, with a message safe to echo back.
    fn client_message(&self) -> Option<&str> {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => Some(msg),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        if let Some(msg) = self.client_message() {
            warn!(code, message = %msg, "Request rejected");
            return failure(status, code, msg);
        }

        // Server-side failures keep their details in the logs.
        let message = match &self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
                "A database error occurred"
            }
            AppError::ProviderError(e) => {
                error!(error = %e, "Payment provider error");
                "The payment provider request failed"
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal error");
                "An internal error occurred"
            }
            _ => "An internal error occurred",
        };
        failure(status, code, message)
    }
}

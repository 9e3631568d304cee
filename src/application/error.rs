use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or missing input, rejected before any mutation
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage, push or email provider failure
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// A multi-step case mutation was rolled back
    #[error("Transaction aborted: {0}")]
    TransactionAborted(#[source] Box<AppError>),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    /// Wrap a failure raised inside a rolled-back case saga
    pub fn aborted(cause: AppError) -> Self {
        match cause {
            AppError::TransactionAborted(_) => cause,
            other => AppError::TransactionAborted(Box::new(other)),
        }
    }

    /// Status code and client-safe message for this error
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service failure".to_string(),
                )
            }
            AppError::TransactionAborted(cause) => {
                let (status, message) = cause.status_and_message();
                (status, format!("Operation rolled back: {}", message))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Json(e) => (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, format!("Invalid input: {}", e)),
            AppError::Jwt(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            AppError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error".to_string(),
                )
            }
            AppError::HttpClient(e) => {
                tracing::error!("HTTP client error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service failure".to_string(),
                )
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_and_message().0
    }

    /// Message safe to show to the caller, as used in HTTP error bodies
    pub fn client_message(&self) -> String {
        self.status_and_message().1
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorResponse { message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

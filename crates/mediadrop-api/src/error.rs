//! HTTP error response conversion
//!
//! **Handler pattern:** return `Result<impl IntoResponse, HttpAppError>` and
//! convert domain errors with `?` or `.map_err(Into::into)`, so every failure
//! renders with the same status, body, and logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediadrop_core::{AppError, ErrorMetadata, LogLevel};
use mediadrop_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: IntoResponse and AppError are both foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_to_app_error(err))
    }
}

/// Map a storage failure onto the request-level taxonomy.
pub(crate) fn storage_to_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::DirectoryUncreatable { .. } => AppError::DirectoryUncreatable(err.to_string()),
        StorageError::DirectoryUnreadable { .. } => AppError::DirectoryUnreadable(err.to_string()),
        StorageError::FileTooLarge { limit_bytes } => AppError::FileTooLarge {
            filename: String::new(),
            limit_bytes,
        },
        StorageError::StreamFailed(msg) => {
            AppError::InvalidMultipart(format!("Failed to read file data: {}", msg))
        }
        StorageError::WriteFailed(_)
        | StorageError::NamesExhausted(_)
        | StorageError::InvalidName(_)
        | StorageError::IoError(_) => AppError::Storage(err.to_string()),
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details never leave the server in production or for sensitive errors.
        let show_details = !is_production_env() && !app_error.is_sensitive();

        let body = ErrorResponse {
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            details: show_details.then(|| app_error.to_string()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

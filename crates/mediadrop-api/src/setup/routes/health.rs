//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
}

/// Reports whether the upload directory can still be read.
pub(super) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let (status_code, storage) =
        match tokio::time::timeout(TIMEOUT, state.storage.check_readable()).await {
            Ok(Ok(())) => (StatusCode::OK, "healthy".to_string()),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Storage health check failed");
                (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {}", e))
            }
            Err(_) => {
                tracing::error!("Storage health check timed out");
                (StatusCode::SERVICE_UNAVAILABLE, "timeout".to_string())
            }
        };

    let status = if status_code == StatusCode::OK {
        "healthy"
    } else {
        "unhealthy"
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: status.to_string(),
            storage,
        }),
    )
}

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use mediadrop_core::FileListingEntry;
use std::sync::Arc;

/// List stored files, newest first.
#[tracing::instrument(skip(state), fields(operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileListingEntry>>, HttpAppError> {
    let files = state.storage.list().await?;
    tracing::debug!(count = files.len(), "Listed stored files");
    Ok(Json(files))
}

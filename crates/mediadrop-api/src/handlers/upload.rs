use crate::error::HttpAppError;
use crate::services::UploadIntake;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use mediadrop_core::{AppError, UploadManifest};
use std::sync::Arc;

/// Accept one or more files from the `files` multipart field.
///
/// A request that is not multipart at all carries no files, so it gets the
/// same 400 as an empty form.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_files"))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadManifest>, HttpAppError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Upload request is not multipart");
        AppError::NoFilesProvided
    })?;

    let intake = UploadIntake::new(&state.storage, state.max_file_size_bytes());
    let files = intake.intake(multipart).await?;

    Ok(Json(UploadManifest::new(files)))
}

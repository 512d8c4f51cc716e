//! Storage setup and initialization

use anyhow::Result;
use mediadrop_core::{AppError, Config};
use mediadrop_storage::UploadDirectory;

/// Create the upload directory before the listener binds.
///
/// Failure here is fatal: without the directory no request can be served.
pub async fn setup_storage(config: &Config) -> Result<UploadDirectory> {
    let storage = UploadDirectory::ensure(config.upload_dir())
        .await
        .map_err(|e| AppError::DirectoryUncreatable(e.to_string()))?;

    tracing::info!(
        upload_dir = %storage.path().display(),
        max_file_size_mb = config.max_file_size_bytes() / 1024 / 1024,
        "Upload directory ready"
    );

    Ok(storage)
}

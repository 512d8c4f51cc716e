//! Upload intake
//!
//! Turns one multipart request into stored files: each `files` part is
//! streamed to its own allocated name, and the request either succeeds for
//! every part or leaves nothing behind.

use axum::extract::Multipart;
use mediadrop_core::constants::UPLOAD_FIELD_NAME;
use mediadrop_core::{AppError, ManifestEntry};
use mediadrop_storage::{StorageError, StoredFile, UploadDirectory};

use crate::error::storage_to_app_error;

pub struct UploadIntake<'a> {
    storage: &'a UploadDirectory,
    max_file_size: u64,
}

impl<'a> UploadIntake<'a> {
    pub fn new(storage: &'a UploadDirectory, max_file_size: u64) -> Self {
        Self {
            storage,
            max_file_size,
        }
    }

    /// Store every file part of the request, in the order received.
    ///
    /// Fails with `NoFilesProvided` when the request carries no file parts.
    /// On any other failure the files already written for this request are
    /// removed before the error is returned.
    pub async fn intake(&self, mut multipart: Multipart) -> Result<Vec<ManifestEntry>, AppError> {
        let mut stored = Vec::new();

        if let Err(e) = self.store_parts(&mut multipart, &mut stored).await {
            self.rollback(&stored).await;
            return Err(e);
        }

        if stored.is_empty() {
            return Err(AppError::NoFilesProvided);
        }

        tracing::info!(count = stored.len(), "Uploaded {} file(s)", stored.len());

        Ok(stored.into_iter().map(manifest_entry).collect())
    }

    async fn store_parts(
        &self,
        multipart: &mut Multipart,
        stored: &mut Vec<StoredFile>,
    ) -> Result<(), AppError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidMultipart(format!("Failed to read multipart: {}", e)))?
        {
            if field.name() != Some(UPLOAD_FIELD_NAME) {
                tracing::debug!(field = ?field.name(), "Skipping non-file multipart field");
                continue;
            }

            // A file input with nothing selected still sends an empty part.
            let original_name = match field.file_name() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            let file = self
                .storage
                .store_stream(&original_name, field, self.max_file_size)
                .await
                .map_err(|e| match e {
                    StorageError::FileTooLarge { limit_bytes } => AppError::FileTooLarge {
                        filename: original_name.clone(),
                        limit_bytes,
                    },
                    other => storage_to_app_error(other),
                })?;

            stored.push(file);
        }

        Ok(())
    }

    async fn rollback(&self, stored: &[StoredFile]) {
        for file in stored {
            if let Err(e) = self.storage.discard(&file.filename).await {
                tracing::error!(
                    error = %e,
                    filename = %file.filename,
                    "Failed to remove file from rejected upload"
                );
            }
        }

        if !stored.is_empty() {
            tracing::warn!(
                removed = stored.len(),
                "Rolled back files from rejected upload"
            );
        }
    }
}

fn manifest_entry(file: StoredFile) -> ManifestEntry {
    ManifestEntry {
        original_name: file.original_name,
        filename: file.filename,
        size: file.size,
        path: file.path.display().to_string(),
    }
}

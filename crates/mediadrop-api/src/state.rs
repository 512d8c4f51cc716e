//! Shared application state

use mediadrop_core::Config;
use mediadrop_storage::UploadDirectory;

/// State handed to every handler.
///
/// Holds no per-request data: the upload directory itself is the only
/// mutable state in the system.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: UploadDirectory,
}

impl AppState {
    pub fn new(config: Config, storage: UploadDirectory) -> Self {
        Self { config, storage }
    }

    /// Per-file upload limit in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.config.max_file_size_bytes()
    }
}

//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant
//! self-describes its HTTP presentation through `ErrorMetadata`, so the API
//! crate renders every error the same way.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client mistakes worth noticing, like oversize uploads
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NO_FILES_PROVIDED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No files provided in upload request")]
    NoFilesProvided,

    #[error("File '{filename}' exceeds the {limit_bytes} byte limit")]
    FileTooLarge { filename: String, limit_bytes: u64 },

    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    #[error("Storage directory unreadable: {0}")]
    DirectoryUnreadable(String),

    #[error("Storage directory could not be created: {0}")]
    DirectoryUncreatable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::NoFilesProvided => (400, "NO_FILES_PROVIDED", false, LogLevel::Debug),
        AppError::FileTooLarge { .. } => (413, "FILE_TOO_LARGE", false, LogLevel::Warn),
        AppError::InvalidMultipart(_) => (400, "INVALID_MULTIPART", false, LogLevel::Debug),
        AppError::DirectoryUnreadable(_) => (500, "DIRECTORY_UNREADABLE", true, LogLevel::Error),
        AppError::DirectoryUncreatable(_) => {
            (500, "DIRECTORY_UNCREATABLE", true, LogLevel::Error)
        }
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::NoFilesProvided => "NoFilesProvided",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::InvalidMultipart(_) => "InvalidMultipart",
            AppError::DirectoryUnreadable(_) => "DirectoryUnreadable",
            AppError::DirectoryUncreatable(_) => "DirectoryUncreatable",
            AppError::Storage(_) => "Storage",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NoFilesProvided => "No files uploaded".to_string(),
            AppError::FileTooLarge { limit_bytes, .. } => format!(
                "File too large: maximum size is {} MB",
                limit_bytes / 1024 / 1024
            ),
            AppError::InvalidMultipart(ref msg) => msg.clone(),
            AppError::DirectoryUnreadable(_) => "Unable to read files".to_string(),
            AppError::DirectoryUncreatable(_) => "Storage unavailable".to_string(),
            AppError::Storage(_) => "Failed to store file".to_string(),
        }
    }
}

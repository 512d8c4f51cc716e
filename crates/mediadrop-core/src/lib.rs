//! Mediadrop Core Library
//!
//! This crate provides the configuration, error taxonomy, and wire models
//! shared by the storage and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod log_format;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use log_format::LogFormat;
pub use models::{FileListingEntry, ManifestEntry, UploadManifest};

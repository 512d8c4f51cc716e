//! Mediadrop Storage Library
//!
//! This crate owns the upload directory: creating it, allocating unique
//! filenames inside it, streaming uploads to disk, and listing its contents.
//!
//! # Filename format
//!
//! Every stored file is named `{millis}-{random}-{original}` where `millis` is
//! the wall-clock time in milliseconds, `random` is drawn from `0..=1e9`, and
//! `original` is the client-supplied name reduced to a single path segment.
//! The directory is flat; nothing is ever written outside of it.

pub mod error;
pub mod local;
pub mod names;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use local::{StoredFile, UploadDirectory};
pub use names::{sanitize_original_name, NameAllocator, TimestampRandomAllocator};

//! Multipart bodies for upload tests.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use mediadrop_core::constants::UPLOAD_FIELD_NAME;

/// A `files` part with the given client filename and content.
pub fn file_part(name: &str, content: impl Into<Vec<u8>>) -> Part {
    Part::bytes(Bytes::from(content.into()))
        .file_name(name.to_string())
        .mime_type("application/octet-stream")
}

/// Form with one `files` part per `(name, content)` pair, in order.
pub fn upload_form(files: &[(&str, &[u8])]) -> MultipartForm {
    files
        .iter()
        .fold(MultipartForm::new(), |form, (name, content)| {
            form.add_part(UPLOAD_FIELD_NAME, file_part(name, content.to_vec()))
        })
}

/// Deterministic content of the given length.
pub fn content_of_len(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

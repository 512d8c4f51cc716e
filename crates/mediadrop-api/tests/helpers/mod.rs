//! Test helpers: build the router over a throwaway upload directory.
//!
//! Run from workspace root: `cargo test -p mediadrop-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use mediadrop_api::setup::build_app;
use mediadrop_core::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Per-file limit used by the integration tests.
pub const TEST_MAX_FILE_SIZE: u64 = 1024;

/// Test application: server plus the directory it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Names of the regular files currently in the upload directory.
    pub fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .expect("Failed to read upload dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Setup a test app whose upload directory does not exist yet.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let upload_dir = temp_dir.path().join("uploads");

    let mut config = Config::default();
    config.upload.upload_dir = upload_dir.clone();
    config.upload.max_file_size_bytes = TEST_MAX_FILE_SIZE;

    let (_state, router) = build_app(config).await.expect("Failed to build app");
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

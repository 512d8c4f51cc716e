//! Configuration module
//!
//! Settings come from environment variables (a `.env` file is honoured via
//! `dotenvy`). Every setting has a default suitable for a trusted LAN, so the
//! server starts with no configuration at all.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_HOST, DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_PORT, DEFAULT_UPLOAD_DIR};
use crate::log_format::LogFormat;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Process-level settings: listener, CORS, environment, logging
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: LogFormat,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

/// Upload intake and storage settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    pub max_file_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * BYTES_PER_MB,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub base: BaseConfig,
    pub upload: UploadConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match get("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let max_file_size_mb = match get("MAX_FILE_SIZE_MB") {
            Some(mb) => mb
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a whole number"))?,
            None => DEFAULT_MAX_FILE_SIZE_MB,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => LogFormat::default(),
        };

        let config = Config {
            base: BaseConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                server_port,
                cors_origins,
                environment,
                log_format,
            },
            upload: UploadConfig {
                upload_dir: PathBuf::from(
                    get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
                ),
                max_file_size_bytes: max_file_size_mb.saturating_mul(BYTES_PER_MB),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.server_port == 0 {
            return Err(anyhow::anyhow!("PORT must be greater than zero"));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.upload.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn host(&self) -> &str {
        &self.base.host
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn log_format(&self) -> LogFormat {
        self.base.log_format
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload.upload_dir
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.upload.max_file_size_bytes
    }
}

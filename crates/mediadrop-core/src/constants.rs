//! Constants shared across crates

/// Multipart field name that carries uploaded files
pub const UPLOAD_FIELD_NAME: &str = "files";

/// URL prefix under which stored files are served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

/// Upper bound (inclusive) of the random component of allocated filenames
pub const NAME_RANDOM_MAX: u32 = 1_000_000_000;

//! Wire models for upload manifests and directory listings

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// One accepted part of an upload request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Client-supplied filename, exactly as received
    pub original_name: String,
    /// Allocated on-disk filename
    pub filename: String,
    pub size: u64,
    /// Storage path of the written file
    pub path: String,
}

/// Response payload of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadManifest {
    pub message: String,
    pub files: Vec<ManifestEntry>,
}

impl UploadManifest {
    pub fn new(files: Vec<ManifestEntry>) -> Self {
        Self {
            message: "Files uploaded successfully".to_string(),
            files,
        }
    }
}

/// A stored file as reported by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListingEntry {
    pub name: String,
    pub size: u64,
    #[serde(serialize_with = "serialize_millis")]
    pub uploaded_at: DateTime<Utc>,
}

fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

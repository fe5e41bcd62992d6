//! Upload request and result types.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single file prepared for upload.
///
/// Built once per file and consumed by the upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Local file to read
    pub local_path: PathBuf,
    /// Bucket key (forward-slash separated, relative)
    pub object_key: String,
    /// MIME type sent as Content-Type
    pub content_type: String,
    /// User metadata attached to the object
    pub metadata: HashMap<String, String>,
}

impl UploadTarget {
    pub fn new(
        local_path: impl Into<PathBuf>,
        object_key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            local_path: local_path.into(),
            object_key: object_key.into(),
            content_type: content_type.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Outcome of one upload attempt.
///
/// Upload calls never return an error; every failure is captured here so
/// a batch can keep going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub object_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set only when local deletion was requested after a successful upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_file_deleted: Option<bool>,
}

impl UploadResult {
    pub fn succeeded(
        object_key: impl Into<String>,
        bucket: impl Into<String>,
        size_bytes: u64,
        public_url: Option<String>,
    ) -> Self {
        Self {
            success: true,
            object_key: object_key.into(),
            bucket: Some(bucket.into()),
            size_bytes: Some(size_bytes),
            public_url,
            error: None,
            local_file_deleted: None,
        }
    }

    pub fn failed(object_key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            object_key: object_key.into(),
            bucket: None,
            size_bytes: None,
            public_url: None,
            error: Some(error.into()),
            local_file_deleted: None,
        }
    }
}

/// Result of an object existence check.
///
/// A failed check is kept apart from a confirmed miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectPresence {
    Exists,
    NotFound,
    CheckFailed(String),
}

impl ObjectPresence {
    /// Boolean view: only a confirmed hit counts as present.
    pub fn is_present(&self) -> bool {
        matches!(self, ObjectPresence::Exists)
    }
}

/// Render a byte count as megabytes, e.g. `12.34 MB`.
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

//! Structured per-file upload logging.
//!
//! Every line for one file carries the local path and object key so a
//! failed run can be diagnosed from the log alone.

use std::path::Path;

use recvault_storage::{format_size_mb, UploadResult};
use tracing::{error, info, warn, Span};

/// Logger bound to a single file upload.
#[derive(Debug, Clone)]
pub struct UploadLogger {
    path: String,
    object_key: String,
}

impl UploadLogger {
    pub fn new(path: &Path, object_key: &str) -> Self {
        Self {
            path: path.display().to_string(),
            object_key: object_key.to_string(),
        }
    }

    pub fn log_start(&self, platform: &str, anchor: &str) {
        info!(
            path = %self.path,
            key = %self.object_key,
            platform = %platform,
            anchor = %anchor,
            "Uploading {}", self.path
        );
    }

    /// Log the outcome of an upload attempt.
    pub fn log_result(&self, result: &UploadResult) {
        if result.success {
            info!(
                path = %self.path,
                key = %result.object_key,
                size = %format_size_mb(result.size_bytes.unwrap_or(0)),
                url = result.public_url.as_deref().unwrap_or("-"),
                "Upload successful"
            );
        } else {
            self.log_failure(result.error.as_deref().unwrap_or("unknown error"));
        }
    }

    pub fn log_failure(&self, message: &str) {
        error!(
            path = %self.path,
            key = %self.object_key,
            "Upload failed: {}", message
        );
    }

    pub fn log_deleted(&self) {
        info!(path = %self.path, "Deleted local file after upload");
    }

    pub fn log_delete_failed(&self, err: &std::io::Error) {
        warn!(path = %self.path, error = %err, "Failed to delete local file");
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    /// Span wrapping all work for this file.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("upload", key = %self.object_key)
    }
}

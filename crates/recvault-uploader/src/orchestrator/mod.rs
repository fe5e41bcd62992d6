//! Upload orchestration.
//!
//! Decides which local files to send, names them in the bucket, and drives
//! the uploader one file at a time:
//!
//! ```text
//! find_candidates -> derive_object_key + SourceLabels -> upload -> (delete local) -> tally
//! ```

pub mod discovery;
pub mod keys;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use recvault_storage::{content_type_for, BucketSession, UploadResult, UploadTarget};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn, Instrument};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::logging::UploadLogger;

pub use discovery::{find_candidates, ExtensionFilter, DEFAULT_VIDEO_EXTENSIONS};
pub use keys::{derive_object_key, SourceLabels, DEFAULT_ROOT_MARKER, UNKNOWN_LABEL};

/// Sends a prepared target to object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Upload one target. Failures are reported in the result.
    async fn upload_target(&self, target: UploadTarget) -> UploadResult;
}

#[async_trait]
impl ObjectUploader for BucketSession {
    async fn upload_target(&self, target: UploadTarget) -> UploadResult {
        BucketSession::upload_target(self, target).await
    }
}

/// Tally of a directory upload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryReport {
    /// Files that passed the extension filter
    pub matched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Files not attempted because shutdown was requested
    pub skipped: usize,
    /// One result per attempted file, in walk order
    pub results: Vec<UploadResult>,
}

/// Drives uploads for single files and directory trees.
pub struct Orchestrator<U> {
    uploader: U,
    marker: String,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<U: ObjectUploader> Orchestrator<U> {
    pub fn new(uploader: U) -> Self {
        Self {
            uploader,
            marker: DEFAULT_ROOT_MARKER.to_string(),
            shutdown: None,
        }
    }

    /// Use a different root marker than `downloads`.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Stop directory uploads between files once `true` is sent.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Upload one recording with platform/anchor metadata.
    ///
    /// When `delete_after` is set and the upload succeeded the local file is
    /// removed; a failed removal is recorded but keeps the upload successful.
    pub async fn upload_one(
        &self,
        local_path: &Path,
        platform: &str,
        anchor: &str,
        delete_after: bool,
    ) -> UploadResult {
        let object_key = derive_object_key(local_path, &self.marker);
        let logger = UploadLogger::new(local_path, &object_key);

        async {
            match tokio::fs::try_exists(local_path).await {
                Ok(true) => {}
                Ok(false) => {
                    logger.log_failure("File not found");
                    return UploadResult::failed(object_key, "File not found");
                }
                Err(e) => {
                    let reason = e.to_string();
                    logger.log_failure(&reason);
                    return UploadResult::failed(object_key, reason);
                }
            }

            let metadata = HashMap::from([
                ("platform".to_string(), platform.to_string()),
                ("anchor".to_string(), anchor.to_string()),
                ("upload_timestamp".to_string(), Utc::now().timestamp().to_string()),
            ]);
            let target = UploadTarget::new(local_path, object_key, content_type_for(local_path))
                .with_metadata(metadata);

            logger.log_start(platform, anchor);
            let mut result = self.uploader.upload_target(target).await;
            logger.log_result(&result);

            if result.success && delete_after {
                let deleted = match tokio::fs::remove_file(local_path).await {
                    Ok(()) => {
                        logger.log_deleted();
                        true
                    }
                    Err(e) => {
                        logger.log_delete_failed(&e);
                        false
                    }
                };
                result.local_file_deleted = Some(deleted);
            }

            result
        }
        .instrument(logger.create_span())
        .await
    }

    /// Upload every matching file under `dir_path`, one at a time.
    ///
    /// `format_filter` is a comma-separated extension list that replaces the
    /// default video set. Per-file failures are counted, never returned.
    pub async fn upload_directory(
        &self,
        dir_path: &Path,
        delete_after: bool,
        format_filter: Option<&str>,
    ) -> OrchestratorResult<DirectoryReport> {
        let is_dir = tokio::fs::metadata(dir_path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(OrchestratorError::not_found(format!(
                "Directory not found: {}",
                dir_path.display()
            )));
        }

        let filter = ExtensionFilter::from_option(format_filter);
        let root: PathBuf = dir_path.to_path_buf();
        let files = tokio::task::spawn_blocking(move || find_candidates(&root, &filter)).await?;

        info!(dir = %dir_path.display(), "Found {} video files to upload", files.len());

        let mut report = DirectoryReport {
            matched: files.len(),
            ..Default::default()
        };

        for path in files {
            if self.is_shutting_down() {
                report.skipped = report.matched - report.succeeded - report.failed;
                warn!(skipped = report.skipped, "Shutdown requested, stopping directory upload");
                break;
            }

            let labels = SourceLabels::infer(&path, &self.marker);
            let result = self
                .upload_one(&path, &labels.platform, &labels.anchor, delete_after)
                .await;

            if result.success {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            report.results.push(result);
        }

        info!(
            "Upload complete: {} successful, {} failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }
}

//! Bucket operations used by the uploader.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use aws_sdk_s3::operation::head_object::HeadObjectError;
use tracing::{error, info};

use crate::client::BucketSession;
use crate::content_type::content_type_for;
use crate::error::StorageError;
use crate::types::{format_size_mb, ObjectPresence, UploadResult, UploadTarget};

/// Default page size for [`BucketSession::list`].
pub const DEFAULT_MAX_KEYS: usize = 1000;

impl BucketSession {
    /// Upload a local file.
    ///
    /// `object_key` defaults to the file name and `content_type` to the
    /// extension lookup. Never fails: errors are reported in the result.
    pub async fn upload(
        &self,
        local_path: impl AsRef<Path>,
        object_key: Option<&str>,
        metadata: Option<HashMap<String, String>>,
        content_type: Option<&str>,
    ) -> UploadResult {
        let local_path = local_path.as_ref();
        let object_key = object_key
            .map(str::to_string)
            .unwrap_or_else(|| default_object_key(local_path));
        let content_type = content_type.unwrap_or_else(|| content_type_for(local_path));

        let target = UploadTarget::new(local_path, object_key, content_type)
            .with_metadata(metadata.unwrap_or_default());

        self.upload_target(target).await
    }

    /// Upload a fully resolved target.
    ///
    /// The transfer runs on its own tokio task so a slow network call does
    /// not hold up other work on the caller's task.
    pub async fn upload_target(&self, target: UploadTarget) -> UploadResult {
        let size = match tokio::fs::metadata(&target.local_path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!(path = %target.local_path.display(), "File not found");
                return UploadResult::failed(target.object_key, "File not found");
            }
            Err(e) => {
                error!(path = %target.local_path.display(), error = %e, "Failed to stat file");
                return UploadResult::failed(target.object_key, StorageError::from(e).to_string());
            }
        };

        info!(
            path = %target.local_path.display(),
            key = %target.object_key,
            "Uploading {} to R2",
            format_size_mb(size)
        );

        let session = self.clone();
        let job = target.clone();
        let outcome = tokio::spawn(async move { session.put_object(&job).await }).await;

        match outcome {
            Ok(Ok(())) => {
                info!(key = %target.object_key, "Uploaded to R2");
                UploadResult::succeeded(
                    target.object_key.clone(),
                    self.bucket.clone(),
                    size,
                    self.public_url_for(&target.object_key),
                )
            }
            Ok(Err(e)) => {
                if e.is_provider_error() {
                    error!(key = %target.object_key, error = %e, "R2 upload failed");
                } else {
                    error!(key = %target.object_key, error = %e, "Unexpected error during upload");
                }
                UploadResult::failed(target.object_key, e.to_string())
            }
            Err(join_err) => {
                error!(key = %target.object_key, error = %join_err, "Upload task aborted");
                UploadResult::failed(target.object_key, join_err.to_string())
            }
        }
    }

    /// Public URL for a key, when a public prefix is configured.
    pub fn public_url_for(&self, object_key: &str) -> Option<String> {
        self.public_url
            .as_deref()
            .map(|base| join_public_url(base, object_key))
    }

    /// Delete an object. Best effort: returns `false` on failure.
    pub async fn delete(&self, object_key: &str) -> bool {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
        {
            Ok(_) => {
                info!(key = %object_key, "Deleted from R2");
                true
            }
            Err(e) => {
                error!(key = %object_key, error = %StorageError::from_sdk(e), "Failed to delete object");
                false
            }
        }
    }

    /// Check whether an object exists.
    pub async fn exists(&self, object_key: &str) -> ObjectPresence {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
        {
            Ok(_) => ObjectPresence::Exists,
            Err(e) if e.as_service_error().is_some_and(HeadObjectError::is_not_found) => {
                ObjectPresence::NotFound
            }
            Err(e) => {
                let err = StorageError::from_sdk(e);
                error!(key = %object_key, error = %err, "Error checking if object exists");
                ObjectPresence::CheckFailed(err.to_string())
            }
        }
    }

    /// List up to `max_keys` object keys under `prefix`.
    ///
    /// Returns an empty list when the listing fails.
    pub async fn list(&self, prefix: &str, max_keys: usize) -> Vec<String> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        while keys.len() < max_keys {
            let remaining = i32::try_from(max_keys - keys.len()).unwrap_or(i32::MAX);
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .max_keys(remaining);

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    error!(prefix = %prefix, error = %StorageError::from_sdk(e), "Failed to list objects");
                    return Vec::new();
                }
            };

            if let Some(ref contents) = response.contents {
                keys.extend(contents.iter().filter_map(|obj| obj.key.clone()));
            }

            if response.is_truncated() == Some(true) {
                match response.next_continuation_token {
                    Some(token) => continuation_token = Some(token),
                    None => break,
                }
            } else {
                break;
            }
        }

        keys.truncate(max_keys);
        keys
    }
}

/// Key used when the caller does not name one: the file's base name.
pub fn default_object_key(local_path: &Path) -> String {
    local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_path.to_string_lossy().into_owned())
}

/// Join a public URL prefix and a key without doubling the slash.
pub fn join_public_url(base: &str, object_key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        object_key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::R2Config;
    use tempfile::TempDir;

    fn session(public_url: Option<&str>) -> BucketSession {
        BucketSession::new(
            R2Config::new("acct", "key", "secret", "recordings")
                .with_public_url(public_url.map(str::to_string)),
        )
        .expect("session")
    }

    fn unreachable_session() -> BucketSession {
        BucketSession::new(
            R2Config::new("acct", "key", "secret", "recordings")
                .with_endpoint_url(Some("http://127.0.0.1:1".to_string())),
        )
        .expect("session")
    }

    #[test]
    fn test_join_public_url() {
        assert_eq!(
            join_public_url("https://cdn.example.com/", "x/y.mp4"),
            "https://cdn.example.com/x/y.mp4"
        );
        assert_eq!(
            join_public_url("https://cdn.example.com", "x/y.mp4"),
            "https://cdn.example.com/x/y.mp4"
        );
        assert_eq!(
            join_public_url("https://cdn.example.com//", "/x/y.mp4"),
            "https://cdn.example.com/x/y.mp4"
        );
    }

    #[test]
    fn test_default_object_key_is_basename() {
        assert_eq!(
            default_object_key(Path::new("/data/downloads/douyin/annie/clip.mp4")),
            "clip.mp4"
        );
        assert_eq!(default_object_key(Path::new("clip.flv")), "clip.flv");
    }

    #[tokio::test]
    async fn test_public_url_for() {
        assert_eq!(
            session(Some("https://cdn.example.com/")).public_url_for("x/y.mp4"),
            Some("https://cdn.example.com/x/y.mp4".to_string())
        );
        assert_eq!(session(None).public_url_for("x/y.mp4"), None);
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails_locally() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.mp4");

        let result = session(None).upload(&missing, None, None, None).await;

        assert!(!result.success);
        assert_eq!(result.object_key, "gone.mp4");
        assert_eq!(result.error.as_deref(), Some("File not found"));
        assert!(result.size_bytes.is_none());
    }

    #[tokio::test]
    async fn test_upload_missing_file_keeps_explicit_key() {
        let result = session(None)
            .upload("/nonexistent/clip.mkv", Some("douyin/a/clip.mkv"), None, None)
            .await;

        assert!(!result.success);
        assert_eq!(result.object_key, "douyin/a/clip.mkv");
    }

    #[tokio::test]
    async fn test_bucket_operations_degrade_when_unreachable() {
        let session = unreachable_session();

        assert!(!session.delete("douyin/a/clip.mp4").await);
        assert!(session.list("douyin/", DEFAULT_MAX_KEYS).await.is_empty());
        assert!(matches!(
            session.exists("douyin/a/clip.mp4").await,
            ObjectPresence::CheckFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported_in_result() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"0123456789").unwrap();

        let result = unreachable_session()
            .upload(&file, Some("douyin/a/clip.mp4"), None, None)
            .await;

        assert!(!result.success);
        assert_eq!(result.object_key, "douyin/a/clip.mp4");
        assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(result.size_bytes.is_none());
        assert!(result.public_url.is_none());
    }
}

//! R2 bucket session.

use std::fmt;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{StorageError, StorageResult};
use crate::types::UploadTarget;

/// Host suffix of the Cloudflare R2 S3 API.
pub const R2_HOST_SUFFIX: &str = "r2.cloudflarestorage.com";

/// Configuration for an R2 bucket session.
#[derive(Clone)]
pub struct R2Config {
    /// Cloudflare account ID
    pub account_id: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// S3 API endpoint, derived from the account ID when unset
    pub endpoint_url: Option<String>,
    /// Public URL prefix for uploaded objects (custom domain or r2.dev)
    pub public_url: Option<String>,
    /// Region (usually "auto" for R2)
    pub region: String,
}

impl R2Config {
    pub fn new(
        account_id: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket_name: bucket_name.into(),
            endpoint_url: None,
            public_url: None,
            region: "auto".to_string(),
        }
    }

    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_public_url(mut self, public_url: Option<String>) -> Self {
        self.public_url = public_url.filter(|s| !s.trim().is_empty());
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let config = Self::new(
            std::env::var("R2_ACCOUNT_ID")
                .map_err(|_| StorageError::config("R2_ACCOUNT_ID not set"))?,
            std::env::var("R2_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config("R2_ACCESS_KEY_ID not set"))?,
            std::env::var("R2_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config("R2_SECRET_ACCESS_KEY not set"))?,
            std::env::var("R2_BUCKET_NAME")
                .map_err(|_| StorageError::config("R2_BUCKET_NAME not set"))?,
        )
        .with_endpoint_url(std::env::var("R2_ENDPOINT_URL").ok())
        .with_public_url(std::env::var("R2_PUBLIC_URL").ok());

        Ok(config)
    }

    /// Endpoint to talk to: the configured one, or the account's R2 endpoint.
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://{}.{}", self.account_id, R2_HOST_SUFFIX),
        }
    }

    fn validate(&self) -> StorageResult<()> {
        let required = [
            ("account_id", &self.account_id),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
            ("bucket_name", &self.bucket_name),
        ];
        let missing: Vec<_> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(StorageError::config(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        let endpoint = self.resolved_endpoint();
        let parsed = Url::parse(&endpoint)
            .map_err(|e| StorageError::config(format!("invalid endpoint URL {}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(StorageError::config(format!(
                "endpoint URL must be an absolute http(s) URL: {}",
                endpoint
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for R2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("R2Config")
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("bucket_name", &self.bucket_name)
            .field("endpoint_url", &self.endpoint_url)
            .field("public_url", &self.public_url)
            .field("region", &self.region)
            .finish()
    }
}

/// Cloudflare R2 bucket session.
///
/// Built once at startup and shared read-only; cloning is cheap because the
/// SDK client is reference counted internally.
#[derive(Clone)]
pub struct BucketSession {
    pub(crate) client: Client,
    pub(crate) account_id: String,
    pub(crate) bucket: String,
    pub(crate) endpoint_url: String,
    pub(crate) public_url: Option<String>,
}

impl BucketSession {
    /// Create a new session from configuration.
    ///
    /// Fails with [`StorageError::Config`] when a required field is empty or
    /// the endpoint is not a usable URL.
    pub fn new(config: R2Config) -> StorageResult<Self> {
        config.validate()?;

        let endpoint_url = config.resolved_endpoint();
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);
        info!(bucket = %config.bucket_name, endpoint = %endpoint_url, "R2 session initialized");

        Ok(Self {
            client,
            account_id: config.account_id,
            bucket: config.bucket_name,
            endpoint_url,
            public_url: config.public_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(R2Config::from_env()?)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }

    /// Send one object to the bucket.
    pub(crate) async fn put_object(&self, target: &UploadTarget) -> StorageResult<()> {
        debug!(path = %target.local_path.display(), key = %target.object_key, "Uploading");

        let body = ByteStream::from_path(&target.local_path)
            .await
            .map_err(|e| StorageError::unexpected(e.to_string()))?;

        let metadata = (!target.metadata.is_empty()).then(|| target.metadata.clone());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&target.object_key)
            .body(body)
            .content_type(&target.content_type)
            .set_metadata(metadata)
            .send()
            .await
            .map_err(StorageError::from_sdk)?;

        Ok(())
    }

    /// Check connectivity to R2 by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(StorageError::from_sdk)?;
        Ok(())
    }
}

impl fmt::Debug for BucketSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketSession")
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

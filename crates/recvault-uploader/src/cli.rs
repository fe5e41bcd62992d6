//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use recvault_storage::R2Config;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::orchestrator::{DEFAULT_ROOT_MARKER, UNKNOWN_LABEL};

#[derive(Debug, Parser)]
#[command(author, version, about = "Upload recorded videos to Cloudflare R2", long_about = None)]
pub struct Args {
    /// File or directory path to upload
    pub path: Option<PathBuf>,

    /// Use configuration from the config file
    #[arg(long)]
    pub config: bool,

    /// Config file read with --config
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config_file: PathBuf,

    /// Upload all videos in the directory
    #[arg(long)]
    pub dir: bool,

    /// Delete local files after upload
    #[arg(long)]
    pub delete: bool,

    /// Platform name
    #[arg(long, default_value = UNKNOWN_LABEL)]
    pub platform: String,

    /// Anchor/streamer name
    #[arg(long, default_value = UNKNOWN_LABEL)]
    pub anchor: String,

    /// Comma-separated extensions to upload in directory mode, e.g. mp4,flv
    #[arg(long, value_name = "EXTS")]
    pub format_filter: Option<String>,

    /// Path segment marking the recordings root
    #[arg(long, default_value = DEFAULT_ROOT_MARKER)]
    pub marker: String,

    /// Only verify that the bucket is reachable with the given credentials
    #[arg(long)]
    pub check: bool,

    /// Print each upload result as a JSON line on stdout
    #[arg(long)]
    pub json: bool,

    /// R2 account ID
    #[arg(long, env = "R2_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// R2 access key ID
    #[arg(long, env = "R2_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// R2 secret access key
    #[arg(long, env = "R2_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// R2 bucket name
    #[arg(long, env = "R2_BUCKET_NAME")]
    pub bucket: Option<String>,

    /// R2 public URL
    #[arg(long, env = "R2_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Custom S3 endpoint (defaults to the account's R2 endpoint)
    #[arg(long, env = "R2_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,
}

impl Args {
    /// Session config from the credential flags.
    ///
    /// All of account ID, access key, secret key and bucket must be present.
    pub fn manual_config(&self) -> OrchestratorResult<R2Config> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        match (
            present(&self.account_id),
            present(&self.access_key),
            present(&self.secret_key),
            present(&self.bucket),
        ) {
            (Some(account_id), Some(access_key), Some(secret_key), Some(bucket)) => {
                Ok(R2Config::new(account_id, access_key, secret_key, bucket)
                    .with_endpoint_url(self.endpoint_url.clone())
                    .with_public_url(self.public_url.clone()))
            }
            _ => Err(OrchestratorError::config(
                "Manual configuration requires: --account-id, --access-key, --secret-key, --bucket \
                 (or use --config to load from the config file)",
            )),
        }
    }
}

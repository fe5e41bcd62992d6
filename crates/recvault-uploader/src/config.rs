//! Uploader configuration.
//!
//! Settings come from an INI file with an `[r2]` section:
//!
//! ```ini
//! [r2]
//! upload_enabled = yes
//! account_id = ...
//! access_key_id = ...
//! secret_access_key = ...
//! bucket_name = recordings
//! endpoint_url =
//! public_url = https://cdn.example.com
//! delete_after_upload = no
//! upload_format_filter = mp4,flv
//! ```

use std::path::Path;

use config::{Config, File, FileFormat};
use recvault_storage::{BucketSession, R2Config};
use serde::Deserialize;

use crate::error::{OrchestratorError, OrchestratorResult};

/// Config file read by `--config` unless `--config-file` says otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.ini";

/// Values accepted as "true" in boolean-like settings.
const TRUE_TOKENS: [&str; 4] = ["是", "yes", "true", "1"];

/// Parse a boolean-like setting. Anything not in the accepted set is false.
pub fn parse_bool_flag(value: &str) -> bool {
    let value = value.trim();
    TRUE_TOKENS.iter().any(|token| value.eq_ignore_ascii_case(token))
}

#[derive(Debug, Default, Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    r2: RawR2Section,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawR2Section {
    upload_enabled: Option<String>,
    account_id: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    bucket_name: Option<String>,
    endpoint_url: Option<String>,
    public_url: Option<String>,
    delete_after_upload: Option<String>,
    upload_format_filter: Option<String>,
}

/// R2 settings loaded from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct R2Settings {
    pub upload_enabled: bool,
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub endpoint_url: Option<String>,
    pub public_url: Option<String>,
    pub delete_after_upload: bool,
    /// Comma-separated extension list replacing the default video set
    pub upload_format_filter: Option<String>,
}

impl R2Settings {
    /// Load settings from an INI file.
    pub fn from_file(path: impl AsRef<Path>) -> OrchestratorResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OrchestratorError::not_found(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        Self::load(Config::builder().add_source(File::from(path).format(FileFormat::Ini)))
    }

    /// Load settings from INI text.
    pub fn from_ini_str(contents: &str) -> OrchestratorResult<Self> {
        Self::load(Config::builder().add_source(File::from_str(contents, FileFormat::Ini)))
    }

    fn load(builder: config::ConfigBuilder<config::builder::DefaultState>) -> OrchestratorResult<Self> {
        let raw: RawConfigFile = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| OrchestratorError::config(e.to_string()))?;

        Ok(Self::from_raw(raw.r2))
    }

    fn from_raw(raw: RawR2Section) -> Self {
        let text = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();
        let optional = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let flag = |value: Option<String>| value.as_deref().is_some_and(parse_bool_flag);

        Self {
            upload_enabled: flag(raw.upload_enabled),
            account_id: text(raw.account_id),
            access_key_id: text(raw.access_key_id),
            secret_access_key: text(raw.secret_access_key),
            bucket_name: text(raw.bucket_name),
            endpoint_url: optional(raw.endpoint_url),
            public_url: optional(raw.public_url),
            delete_after_upload: flag(raw.delete_after_upload),
            upload_format_filter: optional(raw.upload_format_filter),
        }
    }

    /// Validate the settings and turn them into a session config.
    ///
    /// Fails when uploads are disabled or a credential is missing.
    pub fn to_r2_config(&self) -> OrchestratorResult<R2Config> {
        if !self.upload_enabled {
            return Err(OrchestratorError::config(
                "R2 upload is disabled in configuration",
            ));
        }

        let missing: Vec<&str> = [
            ("account_id", &self.account_id),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
            ("bucket_name", &self.bucket_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(OrchestratorError::config(format!(
                "R2 configuration incomplete, missing: {}",
                missing.join(", ")
            )));
        }

        Ok(R2Config::new(
            &self.account_id,
            &self.access_key_id,
            &self.secret_access_key,
            &self.bucket_name,
        )
        .with_endpoint_url(self.endpoint_url.clone())
        .with_public_url(self.public_url.clone()))
    }

    /// Build the bucket session described by these settings.
    pub fn session(&self) -> OrchestratorResult<BucketSession> {
        Ok(BucketSession::new(self.to_r2_config()?)?)
    }
}

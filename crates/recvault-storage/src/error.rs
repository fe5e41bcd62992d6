//! Storage error types.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    Config(String),

    /// Failure reported by the storage service itself.
    #[error("{code}: {message}")]
    Provider { code: String, message: String },

    #[error("{0}")]
    Unexpected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Convert an SDK error, keeping the provider's error code and message
    /// when the service answered.
    pub fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        match err.as_service_error() {
            Some(service) => Self::Provider {
                code: service.code().unwrap_or("Unknown").to_string(),
                message: service
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| service.to_string()),
            },
            None => Self::Unexpected(DisplayErrorContext(&err).to_string()),
        }
    }

    /// Whether the storage service rejected the request (as opposed to a
    /// local or transport failure).
    pub fn is_provider_error(&self) -> bool {
        matches!(self, StorageError::Provider { .. })
    }
}

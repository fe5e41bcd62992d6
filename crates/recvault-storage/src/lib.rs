//! Cloudflare R2 storage session.
//!
//! This crate provides:
//! - Session construction from credentials (endpoint derived from the account ID)
//! - File upload with content-type detection and object metadata
//! - Existence checks, listing and deletion
//! - Public URL construction for uploaded objects

pub mod client;
pub mod content_type;
pub mod error;
pub mod operations;
pub mod types;

pub use client::{BucketSession, R2Config, R2_HOST_SUFFIX};
pub use content_type::{content_type_for, DEFAULT_CONTENT_TYPE};
pub use error::{StorageError, StorageResult};
pub use operations::{default_object_key, join_public_url, DEFAULT_MAX_KEYS};
pub use types::{format_size_mb, ObjectPresence, UploadResult, UploadTarget};

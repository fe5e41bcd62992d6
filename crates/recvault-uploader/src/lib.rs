//! Upload orchestration for recorded videos.
//!
//! This crate provides:
//! - Config file and CLI handling for R2 credentials
//! - Object key and platform/anchor derivation from recording paths
//! - Single-file and directory uploads with optional local cleanup

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;

pub use cli::Args;
pub use config::{parse_bool_flag, R2Settings, DEFAULT_CONFIG_PATH};
pub use error::{OrchestratorError, OrchestratorResult};
pub use logging::UploadLogger;
pub use orchestrator::{
    derive_object_key, DirectoryReport, ExtensionFilter, ObjectUploader, Orchestrator,
    SourceLabels, DEFAULT_ROOT_MARKER,
};

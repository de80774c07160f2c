//! Artifact storage: binary objects addressed by key.
//!
//! Two backends implement [`ArtifactStore`]: an in-memory map used for tests
//! and local runs, and an S3-compatible bucket.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

pub mod memory;
pub mod s3;

pub use memory::MemoryArtifactStore;
pub use s3::S3ArtifactStore;

use crate::config::{StorageBackend, StorageConfig};

/// A stored object with the content type it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    NotFound { key: String },
    WriteFailed { key: String, message: String },
    ReadFailed { key: String, message: String },
    Configuration { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound { key } => write!(f, "object '{}' does not exist", key),
            StorageError::WriteFailed { key, message } => {
                write!(f, "failed to write object '{}': {}", key, message)
            }
            StorageError::ReadFailed { key, message } => {
                write!(f, "failed to read object '{}': {}", key, message)
            }
            StorageError::Configuration { message } => {
                write!(f, "storage misconfigured: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn not_found(key: impl Into<String>) -> Self {
        StorageError::NotFound { key: key.into() }
    }

    pub fn write_failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::WriteFailed {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn read_failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::ReadFailed {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Object storage used for originals, variants and watermark assets.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `data` under `key`, replacing any existing object.
    ///
    /// Returns the path recorded in lineage records; passing it back to
    /// [`ArtifactStore::get`] reads the same object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<String, StorageError>;

    /// Read the object at `key`, or `StorageError::NotFound`.
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the artifact store selected by configuration.
pub fn build_artifact_store(config: &StorageConfig) -> Result<Arc<dyn ArtifactStore>, String> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryArtifactStore::new())),
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .clone()
                .ok_or_else(|| "storage.backend is s3 but no storage.s3 section".to_string())?;
            Ok(Arc::new(S3ArtifactStore::new(s3)))
        }
    }
}

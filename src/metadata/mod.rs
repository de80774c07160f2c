//! Metadata store for lineage records.
//!
//! The hierarchical document layout (collection, document, sub-collection) is
//! flattened into a single keyed table: every record is addressed by its full
//! [`DocumentPath`].

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryMetadataStore;
pub use self::redis::RedisMetadataStore;

use crate::config::{MetadataBackend, MetadataConfig};
use crate::lineage::{DocumentPath, LineageRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    NotFound { path: String },
    WriteFailed { path: String, message: String },
    ReadFailed { path: String, message: String },
    /// Stored document could not be deserialized
    Corrupt { path: String, message: String },
    Connection { message: String },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::NotFound { path } => write!(f, "record '{}' does not exist", path),
            MetadataError::WriteFailed { path, message } => {
                write!(f, "failed to write record '{}': {}", path, message)
            }
            MetadataError::ReadFailed { path, message } => {
                write!(f, "failed to read record '{}': {}", path, message)
            }
            MetadataError::Corrupt { path, message } => {
                write!(f, "record '{}' is malformed: {}", path, message)
            }
            MetadataError::Connection { message } => {
                write!(f, "metadata store connection failed: {}", message)
            }
        }
    }
}

impl std::error::Error for MetadataError {}

impl MetadataError {
    pub fn not_found(path: &DocumentPath) -> Self {
        MetadataError::NotFound {
            path: path.to_string(),
        }
    }

    pub fn write_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        MetadataError::WriteFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn read_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        MetadataError::ReadFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Keyed document store holding one [`LineageRecord`] per path.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Write the record at `path`, replacing any existing one.
    async fn set(&self, path: &DocumentPath, record: &LineageRecord) -> Result<(), MetadataError>;

    /// Read the record at `path`, or `MetadataError::NotFound`.
    async fn get(&self, path: &DocumentPath) -> Result<LineageRecord, MetadataError>;

    /// Whether a record exists at `path`
    async fn exists(&self, path: &DocumentPath) -> Result<bool, MetadataError> {
        match self.get(path).await {
            Ok(_) => Ok(true),
            Err(MetadataError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the metadata store selected by configuration.
pub fn build_metadata_store(config: &MetadataConfig) -> Result<Arc<dyn MetadataStore>, String> {
    match config.backend {
        MetadataBackend::Memory => Ok(Arc::new(MemoryMetadataStore::new())),
        MetadataBackend::Redis => {
            let redis = config.redis.clone().ok_or_else(|| {
                "metadata.backend is redis but no metadata.redis section".to_string()
            })?;
            let store = RedisMetadataStore::new(redis).map_err(|e| e.to_string())?;
            Ok(Arc::new(store))
        }
    }
}

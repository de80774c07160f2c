// Error types module

use std::fmt;

use crate::imaging::ImageError;
use crate::metadata::MetadataError;
use crate::storage::StorageError;

/// Centralized error type for the image service
///
/// Every pipeline operation and API handler reports failures through this
/// type; each variant maps to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Bad base64 payload or undecodable image bytes
    Decode(String),

    /// Missing lineage record or artifact
    NotFound(String),

    /// Artifact or record write failed
    StoreWrite(String),

    /// Backend read failed for a reason other than a missing key
    StoreRead(String),

    /// Missing or invalid request field
    Validation(String),

    /// Resize, encode, composite or worker failure
    Processing(String),

    /// Request body is not the expected JSON
    BadRequest(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServiceError::StoreWrite(msg) => write!(f, "Storage write error: {}", msg),
            ServiceError::StoreRead(msg) => write!(f, "Storage read error: {}", msg),
            ServiceError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::Processing(msg) => write!(f, "Processing error: {}", msg),
            ServiceError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn decode(message: impl Into<String>) -> Self {
        ServiceError::Decode(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn processing(message: impl Into<String>) -> Self {
        ServiceError::Processing(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    /// Map error to HTTP status code
    pub fn to_http_status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::BadRequest(_) => 400,
            ServiceError::Decode(_)
            | ServiceError::NotFound(_)
            | ServiceError::StoreWrite(_)
            | ServiceError::StoreRead(_)
            | ServiceError::Processing(_) => 500,
        }
    }

    /// Short name used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Decode(_) => "decode",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::StoreWrite(_) => "store_write",
            ServiceError::StoreRead(_) => "store_read",
            ServiceError::Validation(_) => "validation",
            ServiceError::Processing(_) => "processing",
            ServiceError::BadRequest(_) => "bad_request",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// Prefix the message with the pipeline step that failed, keeping the kind.
    pub fn with_step(self, step: &str) -> Self {
        let prefix = |msg: String| format!("{} step failed: {}", step, msg);
        match self {
            ServiceError::Decode(msg) => ServiceError::Decode(prefix(msg)),
            ServiceError::NotFound(msg) => ServiceError::NotFound(prefix(msg)),
            ServiceError::StoreWrite(msg) => ServiceError::StoreWrite(prefix(msg)),
            ServiceError::StoreRead(msg) => ServiceError::StoreRead(prefix(msg)),
            ServiceError::Validation(msg) => ServiceError::Validation(prefix(msg)),
            ServiceError::Processing(msg) => ServiceError::Processing(prefix(msg)),
            ServiceError::BadRequest(msg) => ServiceError::BadRequest(prefix(msg)),
        }
    }
}

impl From<ImageError> for ServiceError {
    fn from(err: ImageError) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else if err.is_too_large() {
            ServiceError::Validation(err.to_string())
        } else {
            ServiceError::Processing(err.to_string())
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            StorageError::WriteFailed { .. } => ServiceError::StoreWrite(err.to_string()),
            StorageError::ReadFailed { .. } | StorageError::Configuration { .. } => {
                ServiceError::StoreRead(err.to_string())
            }
        }
    }
}

impl From<MetadataError> for ServiceError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            MetadataError::WriteFailed { .. } => ServiceError::StoreWrite(err.to_string()),
            MetadataError::ReadFailed { .. }
            | MetadataError::Corrupt { .. }
            | MetadataError::Connection { .. } => ServiceError::StoreRead(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Processing(format!("worker task failed: {}", err))
    }
}

//! Artifact and metadata store configuration.
//!
//! Both stores default to in-memory backends so a bare config file starts a
//! working (non-persistent) service.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REDIS_KEY_PREFIX;

/// Which artifact store implementation to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    S3,
}

/// S3 connection settings for the artifact store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, LocalStack); enables path-style addressing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Static credentials; the default AWS credential chain is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3StorageConfig>,
}

/// Which lineage record store implementation to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    #[default]
    Memory,
    Redis,
}

fn default_redis_key_prefix() -> String {
    DEFAULT_REDIS_KEY_PREFIX.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisMetadataConfig {
    pub redis_url: String,
    /// Prefix prepended to every document path (default: "imgvariant:")
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetadataConfig {
    #[serde(default)]
    pub backend: MetadataBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisMetadataConfig>,
}

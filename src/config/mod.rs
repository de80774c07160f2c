// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::LoggingConfig;

pub mod imaging;
pub mod server;
pub mod storage;

pub use imaging::ImagingConfig;
pub use server::ServerConfig;
pub use storage::{
    MetadataBackend, MetadataConfig, RedisMetadataConfig, S3StorageConfig, StorageBackend,
    StorageConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub imaging: ImagingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = missing {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port cannot be 0".to_string());
        }
        if self.server.threads == 0 {
            return Err("server.threads must be at least 1".to_string());
        }
        if self.server.max_body_size == 0 {
            return Err("server.max_body_size must be greater than 0".to_string());
        }

        if self.storage.backend == StorageBackend::S3 {
            let s3 = self
                .storage
                .s3
                .as_ref()
                .ok_or_else(|| "storage.backend is s3 but no storage.s3 section".to_string())?;
            if s3.bucket.is_empty() {
                return Err("storage.s3.bucket cannot be empty".to_string());
            }
            if s3.region.is_empty() {
                return Err("storage.s3.region cannot be empty".to_string());
            }
            if s3.access_key.is_some() != s3.secret_key.is_some() {
                return Err(
                    "storage.s3.access_key and storage.s3.secret_key must be set together"
                        .to_string(),
                );
            }
        }

        if self.metadata.backend == MetadataBackend::Redis {
            let redis = self.metadata.redis.as_ref().ok_or_else(|| {
                "metadata.backend is redis but no metadata.redis section".to_string()
            })?;
            if redis.redis_url.is_empty() {
                return Err("metadata.redis.redis_url cannot be empty".to_string());
            }
        }

        self.imaging.validate()
    }
}

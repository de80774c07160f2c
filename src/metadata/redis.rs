//! Redis-backed metadata store. Records are stored as JSON strings.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;

use super::{MetadataError, MetadataStore};
use crate::config::RedisMetadataConfig;
use crate::lineage::{DocumentPath, LineageRecord};

/// Metadata store keeping each record under `<key_prefix><document path>`.
///
/// The connection manager is created on first use, on the runtime that serves
/// requests.
pub struct RedisMetadataStore {
    client: Client,
    key_prefix: String,
    connection: OnceCell<ConnectionManager>,
}

impl RedisMetadataStore {
    /// Validate the URL and prepare a client; no connection is opened yet.
    pub fn new(config: RedisMetadataConfig) -> Result<Self, MetadataError> {
        let client = Client::open(config.redis_url.as_str()).map_err(|e| {
            MetadataError::Connection {
                message: format!("Invalid Redis URL: {}", e),
            }
        })?;

        Ok(Self {
            client,
            key_prefix: config.key_prefix,
            connection: OnceCell::new(),
        })
    }

    pub fn key_for(&self, path: &DocumentPath) -> String {
        format!("{}{}", self.key_prefix, path)
    }

    async fn connection(&self) -> Result<ConnectionManager, MetadataError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| MetadataError::Connection {
                        message: format!("Failed to connect to Redis: {}", e),
                    })?;
                tracing::info!(prefix = %self.key_prefix, "Redis metadata store connected");
                Ok::<_, MetadataError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl MetadataStore for RedisMetadataStore {
    async fn set(&self, path: &DocumentPath, record: &LineageRecord) -> Result<(), MetadataError> {
        let payload = serde_json::to_string(record)
            .map_err(|e| MetadataError::write_failed(path.as_str(), e.to_string()))?;

        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(self.key_for(path), payload)
            .await
            .map_err(|e| MetadataError::write_failed(path.as_str(), e.to_string()))?;

        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> Result<LineageRecord, MetadataError> {
        let mut conn = self.connection().await?;
        let payload = conn
            .get::<_, Option<String>>(self.key_for(path))
            .await
            .map_err(|e| MetadataError::read_failed(path.as_str(), e.to_string()))?;

        let payload = payload.ok_or_else(|| MetadataError::not_found(path))?;
        serde_json::from_str(&payload).map_err(|e| MetadataError::Corrupt {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

// Verify Send + Sync bounds (required for async trait)
fn _assert_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<RedisMetadataStore>();
    assert_sync::<RedisMetadataStore>();
}

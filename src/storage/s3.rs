//! S3-compatible artifact store built on `aws-sdk-s3`.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tokio::sync::OnceCell;

use super::{ArtifactStore, StorageError, StoredObject};
use crate::config::S3StorageConfig;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Artifact store writing objects into a single bucket.
///
/// The SDK client is built on first use so construction stays synchronous.
pub struct S3ArtifactStore {
    config: S3StorageConfig,
    client: OnceCell<S3Client>,
}

impl S3ArtifactStore {
    pub fn new(config: S3StorageConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn client(&self) -> &S3Client {
        self.client
            .get_or_init(|| build_client(&self.config))
            .await
    }
}

async fn build_client(config: &S3StorageConfig) -> S3Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "imgvariant-config",
        ));
    }

    let shared = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        endpoint = config.endpoint.as_deref().unwrap_or("aws"),
        "S3 artifact store client initialized"
    );

    S3Client::from_conf(builder.build())
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = data.len();
        self.client()
            .await
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::write_failed(key, format!("S3 put failed: {e}")))?;

        tracing::debug!(bucket = %self.config.bucket, key, size, "stored artifact");
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let response = self
            .client()
            .await
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()) == Some(true) {
                    StorageError::not_found(key)
                } else {
                    StorageError::read_failed(key, format!("S3 fetch failed: {e}"))
                }
            })?;

        let content_type = response
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::read_failed(key, format!("Failed to read S3 body: {e}")))?;

        Ok(StoredObject {
            data: bytes.into_bytes(),
            content_type,
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

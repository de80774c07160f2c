//! In-memory artifact store.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{ArtifactStore, StorageError, StoredObject};

/// Artifact store backed by a process-local map. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if key.is_empty() {
            return Err(StorageError::write_failed(key, "empty key"));
        }
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

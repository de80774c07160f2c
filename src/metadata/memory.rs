//! In-memory metadata store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{MetadataError, MetadataStore};
use crate::lineage::{DocumentPath, LineageRecord};

#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<DocumentPath, LineageRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// All stored paths, sorted
    pub fn paths(&self) -> Vec<DocumentPath> {
        let mut paths: Vec<DocumentPath> = self.records.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn set(&self, path: &DocumentPath, record: &LineageRecord) -> Result<(), MetadataError> {
        self.records.write().insert(path.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, path: &DocumentPath) -> Result<LineageRecord, MetadataError> {
        self.records
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| MetadataError::not_found(path))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

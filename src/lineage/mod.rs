//! Lineage records: one document per stored artifact.
//!
//! An uploaded original is the root of a small tree. Resized variants hang off
//! the root by size label and watermarked variants by `watermarked_<size>`:
//!
//! ```text
//! posts/image_20240101_120000
//! posts/image_20240101_120000/resized_images/medium
//! posts/image_20240101_120000/watermarks/watermarked_medium
//! ```
//!
//! Provisioned watermark assets live outside the tree under
//! `watermark_assets/<name>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::imaging::SizeLabel;

pub const POSTS_COLLECTION: &str = "posts";
pub const RESIZED_COLLECTION: &str = "resized_images";
pub const WATERMARKS_COLLECTION: &str = "watermarks";
pub const ASSETS_COLLECTION: &str = "watermark_assets";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Original,
    Resized,
    Watermarked,
    Asset,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Original => "original",
            ArtifactKind::Resized => "resized",
            ArtifactKind::Watermarked => "watermarked",
            ArtifactKind::Asset => "asset",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slash-separated address of a record in the metadata store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a lineage record: `(parent id, kind, size)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Original { id: String },
    Resized { id: String, size: SizeLabel },
    Watermarked { id: String, size: SizeLabel },
    Asset { name: String },
}

impl RecordKey {
    pub fn original(id: impl Into<String>) -> Self {
        RecordKey::Original { id: id.into() }
    }

    pub fn resized(id: impl Into<String>, size: SizeLabel) -> Self {
        RecordKey::Resized {
            id: id.into(),
            size,
        }
    }

    pub fn watermarked(id: impl Into<String>, size: SizeLabel) -> Self {
        RecordKey::Watermarked {
            id: id.into(),
            size,
        }
    }

    pub fn asset(name: impl Into<String>) -> Self {
        RecordKey::Asset { name: name.into() }
    }

    /// Id of the root image (or the asset name)
    pub fn parent_id(&self) -> &str {
        match self {
            RecordKey::Original { id }
            | RecordKey::Resized { id, .. }
            | RecordKey::Watermarked { id, .. } => id,
            RecordKey::Asset { name } => name,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            RecordKey::Original { .. } => ArtifactKind::Original,
            RecordKey::Resized { .. } => ArtifactKind::Resized,
            RecordKey::Watermarked { .. } => ArtifactKind::Watermarked,
            RecordKey::Asset { .. } => ArtifactKind::Asset,
        }
    }

    pub fn size(&self) -> Option<SizeLabel> {
        match self {
            RecordKey::Resized { size, .. } | RecordKey::Watermarked { size, .. } => Some(*size),
            RecordKey::Original { .. } | RecordKey::Asset { .. } => None,
        }
    }

    /// The key of the record this one derives from
    pub fn parent(&self) -> Option<RecordKey> {
        match self {
            RecordKey::Original { .. } | RecordKey::Asset { .. } => None,
            RecordKey::Resized { id, .. } => Some(RecordKey::original(id.clone())),
            RecordKey::Watermarked { id, size } => Some(RecordKey::resized(id.clone(), *size)),
        }
    }

    /// Document id of the record within its collection
    pub fn record_id(&self) -> String {
        match self {
            RecordKey::Original { id } => id.clone(),
            RecordKey::Resized { size, .. } => size.as_str().to_string(),
            RecordKey::Watermarked { size, .. } => format!("watermarked_{}", size),
            RecordKey::Asset { name } => name.clone(),
        }
    }

    pub fn document_path(&self) -> DocumentPath {
        let path = match self {
            RecordKey::Original { id } => format!("{}/{}", POSTS_COLLECTION, id),
            RecordKey::Resized { id, .. } => format!(
                "{}/{}/{}/{}",
                POSTS_COLLECTION,
                id,
                RESIZED_COLLECTION,
                self.record_id()
            ),
            RecordKey::Watermarked { id, .. } => format!(
                "{}/{}/{}/{}",
                POSTS_COLLECTION,
                id,
                WATERMARKS_COLLECTION,
                self.record_id()
            ),
            RecordKey::Asset { name } => format!("{}/{}", ASSETS_COLLECTION, name),
        };
        DocumentPath(path)
    }

    /// Object key of the artifact this record describes
    pub fn artifact_key(&self) -> String {
        match self {
            RecordKey::Original { id } => format!("{}.jpg", id),
            RecordKey::Resized { id, size } => format!("resized/{}_{}.jpg", size, id),
            RecordKey::Watermarked { id, size } => {
                format!("watermarked/{}_watermarked_{}.jpg", size, id)
            }
            RecordKey::Asset { name } => format!("assets/{}", name),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document_path())
    }
}

/// Metadata document describing one stored artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Kind")]
    pub kind: ArtifactKind,
    #[serde(rename = "Size", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeLabel>,
    #[serde(rename = "Description")]
    pub description: String,
    /// Artifact store path of the described object
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "ParentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
}

impl LineageRecord {
    /// Build the record for `key`, pointing at `path`.
    pub fn new(key: &RecordKey, description: impl Into<String>, path: impl Into<String>) -> Self {
        let parent_id = match key {
            RecordKey::Resized { id, .. } | RecordKey::Watermarked { id, .. } => Some(id.clone()),
            RecordKey::Original { .. } | RecordKey::Asset { .. } => None,
        };
        Self {
            id: key.record_id(),
            kind: key.kind(),
            size: key.size(),
            description: description.into(),
            path: path.into(),
            parent_id,
            created_at: Utc::now(),
        }
    }
}

// Static files - serves the browser client from a configured directory

use std::path::{Path, PathBuf};

use super::ApiResponse;

/// File served for `GET /`
pub const INDEX_FILE: &str = "index.html";

/// Read-only view of a directory served under `/static`
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a relative request path onto the root directory.
    ///
    /// Returns `None` for anything that could leave the root: parent or
    /// current-dir segments, backslashes and absolute paths.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        if relative.is_empty() || relative.starts_with('/') || relative.contains('\\') {
            return None;
        }

        let mut path = self.root.clone();
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }

    /// Serve one file, with a content type guessed from its extension.
    pub async fn serve(&self, relative: &str) -> ApiResponse {
        let path = match self.resolve(relative) {
            Some(path) => path,
            None => return ApiResponse::not_found(),
        };

        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return ApiResponse::not_found();
        }

        match tokio::fs::read(&path).await {
            Ok(body) => ApiResponse {
                status: 200,
                content_type: mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string(),
                body,
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read static file");
                ApiResponse::json(500, serde_json::json!({ "error": "Failed to read file" }))
            }
        }
    }
}

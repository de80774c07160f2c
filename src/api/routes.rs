//! Route table for the versioned API.

/// A matched API route with its raw path parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Upload,
    Resize { size: String },
    Watermark { size: String },
    FetchVariant { id: String, size: String },
    FetchWatermarked { id: String, size: String },
    UploadWatermarkAsset,
    /// Browser client entry page
    Index,
    /// File under the static directory
    Static { path: String },
}

impl Route {
    /// Handler name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Route::Health => "health",
            Route::Upload => "upload",
            Route::Resize { .. } => "resize",
            Route::Watermark { .. } => "watermark",
            Route::FetchVariant { .. } => "fetch_variant",
            Route::FetchWatermarked { .. } => "fetch_watermarked",
            Route::UploadWatermarkAsset => "upload_watermark",
            Route::Index => "index",
            Route::Static { .. } => "static",
        }
    }
}

/// Match a method and path (without query string) to a route.
pub fn match_route(method: &str, path: &str) -> Option<Route> {
    let trimmed = path.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    match (method, segments.as_slice()) {
        ("GET", []) => Some(Route::Index),
        ("GET", ["static", rest @ ..]) if !rest.is_empty() => Some(Route::Static {
            path: rest.join("/"),
        }),
        ("GET", ["v1", "health"]) => Some(Route::Health),
        ("POST", ["v1", "health"]) => Some(Route::Upload),
        ("POST", ["v1", "uploadWatermark"]) => Some(Route::UploadWatermarkAsset),
        ("POST", ["v1", "health", size]) => Some(Route::Resize {
            size: size.to_string(),
        }),
        ("POST", ["v1", "health", size, "water"]) => Some(Route::Watermark {
            size: size.to_string(),
        }),
        ("GET", ["v1", "health", id, size]) => Some(Route::FetchVariant {
            id: id.to_string(),
            size: size.to_string(),
        }),
        ("GET", ["v1", "health", id, size, "water"]) => Some(Route::FetchWatermarked {
            id: id.to_string(),
            size: size.to_string(),
        }),
        _ => None,
    }
}

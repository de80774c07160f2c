//! HTTP API layer: routing, JSON bodies and status mapping.
//!
//! Handlers are transport independent: they take a [`RequestContext`] and the
//! collected body and return an [`ApiResponse`]. The Pingora service in
//! `crate::server` only moves bytes in and out.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;

pub mod context;
pub mod routes;
pub mod static_files;

pub use context::RequestContext;
pub use routes::{match_route, Route};
pub use static_files::StaticFiles;

use crate::error::ServiceError;
use crate::imaging::SizeLabel;
use crate::pipeline::ImagePipeline;
use crate::storage::StoredObject;

pub const HEALTH_MESSAGE: &str = "API is working fine !!!!";
const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// Response produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// JSON response with the given status
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: value.to_string().into_bytes(),
        }
    }

    /// `{"error": ...}` with the error's status
    pub fn error(err: &ServiceError) -> Self {
        Self::json(err.to_http_status(), json!({ "error": err.to_string() }))
    }

    /// Raw stored object, served with its recorded content type
    pub fn object(object: StoredObject) -> Self {
        Self {
            status: 200,
            content_type: object.content_type,
            body: object.data.to_vec(),
        }
    }

    pub fn not_found() -> Self {
        Self::json(404, json!({ "error": "Route not found" }))
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::json(
            413,
            json!({ "error": format!("Request body exceeds {} bytes", limit) }),
        )
    }
}

#[derive(Debug, Deserialize)]
struct UploadRequest {
    #[serde(default, rename = "base64image")]
    base64_image: String,
}

#[derive(Debug, Deserialize)]
struct ImageIdRequest {
    #[serde(default, rename = "imageID")]
    image_id: String,
}

#[derive(Debug, Deserialize)]
struct WatermarkAssetRequest {
    #[serde(default, rename = "base64image")]
    base64_image: String,
    #[serde(default, rename = "imagename")]
    image_name: String,
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting malformed request body");
        ServiceError::bad_request(INVALID_BODY_MESSAGE)
    })
}

fn parse_size(size: &str) -> Result<SizeLabel, ServiceError> {
    size.parse::<SizeLabel>().map_err(ServiceError::validation)
}

/// Dispatches API requests to the image pipeline.
#[derive(Debug, Clone)]
pub struct ApiHandler {
    pipeline: Arc<ImagePipeline>,
    max_body_size: usize,
    static_files: Option<StaticFiles>,
}

impl ApiHandler {
    pub fn new(pipeline: Arc<ImagePipeline>, max_body_size: usize) -> Self {
        Self {
            pipeline,
            max_body_size,
            static_files: None,
        }
    }

    /// Also serve the browser client from `files`.
    pub fn with_static_files(mut self, files: StaticFiles) -> Self {
        self.static_files = Some(files);
        self
    }

    pub fn static_files(&self) -> Option<&StaticFiles> {
        self.static_files.as_ref()
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Handle one request inside a span carrying its request id.
    pub async fn handle(&self, ctx: &RequestContext, body: &[u8]) -> ApiResponse {
        let span = tracing::info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
        );

        async {
            let response = self.dispatch(ctx, body).await;
            if response.status >= 500 {
                tracing::error!(
                    status = response.status,
                    elapsed_ms = ctx.elapsed_ms() as u64,
                    "request failed"
                );
            } else {
                tracing::info!(
                    status = response.status,
                    elapsed_ms = ctx.elapsed_ms() as u64,
                    "request completed"
                );
            }
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, ctx: &RequestContext, body: &[u8]) -> ApiResponse {
        if body.len() > self.max_body_size {
            return ApiResponse::payload_too_large(self.max_body_size);
        }

        let route = match match_route(ctx.method(), ctx.path()) {
            Some(route) => route,
            None => return ApiResponse::not_found(),
        };

        let result = match &route {
            Route::Index => return self.serve_static(static_files::INDEX_FILE).await,
            Route::Static { path } => return self.serve_static(path).await,
            Route::Health => Ok(ApiResponse::json(200, json!({ "message": HEALTH_MESSAGE }))),
            Route::Upload => self.upload(body).await,
            Route::Resize { size } => self.resize(size, body).await,
            Route::Watermark { size } => self.watermark(size, body).await,
            Route::FetchVariant { id, size } => self.fetch_variant(id, size).await,
            Route::FetchWatermarked { id, size } => self.fetch_watermarked(id, size).await,
            Route::UploadWatermarkAsset => self.upload_watermark(body).await,
        };

        result.unwrap_or_else(|err| {
            tracing::warn!(
                route = route.name(),
                kind = err.kind(),
                error = %err,
                "handler returned error"
            );
            ApiResponse::error(&err)
        })
    }

    async fn serve_static(&self, path: &str) -> ApiResponse {
        match &self.static_files {
            Some(files) => files.serve(path).await,
            None => ApiResponse::not_found(),
        }
    }

    async fn upload(&self, body: &[u8]) -> Result<ApiResponse, ServiceError> {
        let request: UploadRequest = parse_body(body)?;
        let outcome = self.pipeline.upload(&request.base64_image).await?;
        Ok(ApiResponse::json(
            200,
            json!({ "status": outcome.status, "imageID": outcome.image_id }),
        ))
    }

    async fn resize(&self, size: &str, body: &[u8]) -> Result<ApiResponse, ServiceError> {
        let request: ImageIdRequest = parse_body(body)?;
        let size = parse_size(size)?;
        let outcome = self.pipeline.resize(&request.image_id, size).await?;
        Ok(ApiResponse::json(200, json!({ "status": outcome.status })))
    }

    async fn watermark(&self, size: &str, body: &[u8]) -> Result<ApiResponse, ServiceError> {
        let request: ImageIdRequest = parse_body(body)?;
        let size = parse_size(size)?;
        let outcome = self
            .pipeline
            .ensure_watermarked(&request.image_id, size)
            .await?;
        Ok(ApiResponse::json(200, json!({ "status": outcome.status })))
    }

    async fn fetch_variant(&self, id: &str, size: &str) -> Result<ApiResponse, ServiceError> {
        let size = parse_size(size)?;
        let object = self.pipeline.fetch_variant(id, size).await?;
        Ok(ApiResponse::object(object))
    }

    async fn fetch_watermarked(&self, id: &str, size: &str) -> Result<ApiResponse, ServiceError> {
        let size = parse_size(size)?;
        let object = self.pipeline.fetch_watermarked(id, size).await?;
        Ok(ApiResponse::object(object))
    }

    async fn upload_watermark(&self, body: &[u8]) -> Result<ApiResponse, ServiceError> {
        let request: WatermarkAssetRequest = parse_body(body)?;
        let outcome = self
            .pipeline
            .upload_watermark(&request.image_name, &request.base64_image)
            .await?;
        Ok(ApiResponse::json(
            200,
            json!({ "status": outcome.status, "imageName": outcome.name }),
        ))
    }
}

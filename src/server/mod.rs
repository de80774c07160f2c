// Server module - Pingora HTTP service wiring for the API handler

use async_trait::async_trait;
use http::{header, Response, StatusCode};
use pingora_core::apps::http_app::{HttpServer, ServeHttp};
use pingora_core::protocols::http::ServerSession;
use pingora_core::services::listening::Service;
use std::sync::Arc;

use crate::api::{ApiHandler, ApiResponse, RequestContext, StaticFiles};
use crate::config::Config;
use crate::metadata::build_metadata_store;
use crate::pipeline::ImagePipeline;
use crate::storage::build_artifact_store;

pub const SERVICE_NAME: &str = "imgvariant api";

/// Pingora application serving the image API
pub struct ImageService {
    handler: ApiHandler,
}

impl ImageService {
    pub fn new(handler: ApiHandler) -> Self {
        Self { handler }
    }

    /// Build stores and pipeline from configuration.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let artifacts = build_artifact_store(&config.storage)?;
        let metadata = build_metadata_store(&config.metadata)?;

        tracing::info!(
            artifacts = artifacts.backend_name(),
            metadata = metadata.backend_name(),
            "stores configured"
        );

        let pipeline = ImagePipeline::new(artifacts, metadata, &config.imaging)?;
        let mut handler = ApiHandler::new(Arc::new(pipeline), config.server.max_body_size);
        if let Some(dir) = &config.server.static_dir {
            let files = StaticFiles::new(dir);
            tracing::info!(root = %files.root().display(), "serving browser client");
            handler = handler.with_static_files(files);
        }

        Ok(Self::new(handler))
    }

    pub fn handler(&self) -> &ApiHandler {
        &self.handler
    }
}

/// Outcome of reading a request body under a size limit
#[derive(Debug, PartialEq, Eq)]
enum BodyRead {
    Complete(Vec<u8>),
    TooLarge,
}

async fn read_body(session: &mut ServerSession, limit: usize) -> Result<BodyRead, String> {
    let mut body = Vec::new();
    loop {
        match session.read_request_body().await {
            Ok(Some(chunk)) => {
                if body.len() + chunk.len() > limit {
                    return Ok(BodyRead::TooLarge);
                }
                body.extend_from_slice(&chunk);
            }
            Ok(None) => return Ok(BodyRead::Complete(body)),
            Err(e) => return Err(e.to_string()),
        }
    }
}

/// Convert a handler response into an HTTP response
pub fn to_http_response(response: ApiResponse) -> Response<Vec<u8>> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let length = response.body.len();

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, response.content_type)
        .header(header::CONTENT_LENGTH, length)
        .body(response.body)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to build response");
            let mut fallback = Response::new(Vec::new());
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

#[async_trait]
impl ServeHttp for ImageService {
    async fn response(&self, session: &mut ServerSession) -> Response<Vec<u8>> {
        let req = session.req_header();
        let method = req.method.as_str().to_string();
        let target = req
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri.path().to_string());
        let ctx = RequestContext::new(method, &target);

        let limit = self.handler.max_body_size();
        let response = match read_body(session, limit).await {
            Ok(BodyRead::Complete(body)) => self.handler.handle(&ctx, &body).await,
            Ok(BodyRead::TooLarge) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    path = %ctx.path(),
                    limit,
                    "request body too large"
                );
                ApiResponse::payload_too_large(limit)
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    error = %e,
                    "failed to read request body"
                );
                ApiResponse::json(400, serde_json::json!({ "error": "Invalid request body" }))
            }
        };

        to_http_response(response)
    }
}

/// Build the listening service for the configured address.
pub fn build_service(config: &Config, app: ImageService) -> Service<HttpServer<ImageService>> {
    let mut service = Service::new(SERVICE_NAME.to_string(), HttpServer::new_app(app));
    service.add_tcp(&config.server.listen_addr());
    service.threads = Some(config.server.threads);
    service
}

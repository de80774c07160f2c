// Request context - per-request identity carried through handling and logs

use std::time::Instant;
use uuid::Uuid;

/// Information about one HTTP request as it flows through the API layer
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    started: Instant,
}

impl RequestContext {
    /// Create a context from the method and raw request target.
    /// Generates a UUID v4 request id; the query string is dropped.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let path = match target.split_once('?') {
            Some((path, _query)) => path,
            None => target,
        };

        Self {
            request_id: Uuid::new_v4().to_string(),
            method: method.into(),
            path: path.to_string(),
            started: Instant::now(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path without the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

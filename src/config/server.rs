//! Server configuration types.
//!
//! Address and port bindings, worker threads, the request body limit and
//! the optional browser client directory.
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ADDRESS, DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, DEFAULT_THREADS};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of worker threads (default: 1)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Maximum request body size in bytes (default: 20 MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Directory holding the browser client, served at `/` and `/static/*`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            threads: default_threads(),
            max_body_size: default_max_body_size(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

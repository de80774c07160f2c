// Imgvariant image service library

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod imaging;
pub mod lineage;
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod watermark;

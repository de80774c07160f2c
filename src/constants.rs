// Constants module - centralized default values for configuration
//
// Defaults live here instead of being scattered through the config structs
// as magic numbers.

// =============================================================================
// Server defaults
// =============================================================================

/// Default listening address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 1;

/// Default maximum request body size (20 MB, base64 inflates images by a third)
pub const DEFAULT_MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

// =============================================================================
// Imaging defaults
// =============================================================================

/// Default JPEG quality for stored variants
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Default alpha applied to watermark pixels
pub const DEFAULT_WATERMARK_ALPHA: f64 = 0.7;

/// Default watermark width as a fraction of the base image width
pub const DEFAULT_WATERMARK_WIDTH_FRACTION: f64 = 0.2;

/// Default name of the provisioned watermark asset
pub const DEFAULT_WATERMARK_ASSET_NAME: &str = "Icares_Logo.png";

/// Default number of decoded watermark assets kept in memory
pub const DEFAULT_WATERMARK_CACHE_ENTRIES: u64 = 16;

/// Default maximum width of a decoded or produced image
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 10_000;

/// Default maximum height of a decoded or produced image
pub const DEFAULT_MAX_IMAGE_HEIGHT: u32 = 10_000;

/// Default maximum pixel count of a decoded or produced image (100 megapixels)
pub const DEFAULT_MAX_IMAGE_PIXELS: u64 = 100_000_000;

/// Default UTC offset (hours) used when stamping image ids
pub const DEFAULT_ID_UTC_OFFSET_HOURS: i32 = 8;

// =============================================================================
// Metadata defaults
// =============================================================================

/// Default key prefix for Redis-backed lineage records
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "imgvariant:";

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level filter when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

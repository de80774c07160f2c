// Configuration loading and validation tests

use std::io::Write;
use tempfile::NamedTempFile;

use imgvariant::config::{Config, MetadataBackend, StorageBackend};
use imgvariant::imaging::TargetWidths;
use imgvariant::logging::LogFormat;
use imgvariant::pipeline::PipelineSettings;

fn load(yaml: &str) -> Result<Config, String> {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    Config::from_file(file.path())
}

// Test: the sample config shipped with the repository loads and validates
#[test]
fn test_sample_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.yaml");
    let config = Config::from_file(path).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
}

// Test: a complete config with every section parses
#[test]
fn test_full_config() {
    let config = load(
        r#"
server:
  address: "127.0.0.1"
  port: 5050
  threads: 2
  max_body_size: 1048576

storage:
  backend: s3
  s3:
    bucket: "image-variants"
    region: "ap-southeast-1"
    endpoint: "http://minio:9000"
    access_key: "minio"
    secret_key: "minio123"

metadata:
  backend: redis
  redis:
    redis_url: "redis://redis:6379/0"
    key_prefix: "lineage:"

imaging:
  jpeg_quality: 90
  target_widths:
    small: 160
    medium: 640
    large: 1920
  watermark_alpha: 0.5
  watermark_width_fraction: 0.25
  watermark_asset_name: "brand.png"
  watermark_seed_path: "/etc/imgvariant/brand.png"
  id_utc_offset_hours: 0
  watermark_cache_entries: 4

logging:
  level: "imgvariant=debug,info"
  format: pretty
"#,
    )
    .unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.server.listen_addr(), "127.0.0.1:5050");
    assert_eq!(config.metadata.backend, MetadataBackend::Redis);
    assert_eq!(config.metadata.redis.as_ref().unwrap().key_prefix, "lineage:");
    assert_eq!(
        config.imaging.target_widths,
        TargetWidths {
            small: 160,
            medium: 640,
            large: 1920
        }
    );
    assert_eq!(config.logging.format, LogFormat::Pretty);

    let settings = PipelineSettings::from_config(&config.imaging).unwrap();
    assert_eq!(settings.quality.quality, 90);
    assert_eq!(settings.watermark.alpha, 0.5);
    assert_eq!(settings.id_offset.local_minus_utc(), 0);
}

// Test: credentials can come from the environment
#[test]
fn test_env_substitution_in_file() {
    std::env::set_var("IMGVARIANT_IT_SECRET", "from-env");
    let config = load(
        r#"
storage:
  backend: s3
  s3:
    bucket: "b"
    region: "r"
    access_key: "ak"
    secret_key: "${IMGVARIANT_IT_SECRET}"
"#,
    )
    .unwrap();
    std::env::remove_var("IMGVARIANT_IT_SECRET");

    assert_eq!(
        config.storage.s3.unwrap().secret_key.as_deref(),
        Some("from-env")
    );
}

// Test: invalid values are rejected by validate()
#[test]
fn test_validation_failures() {
    let cases = [
        "storage:\n  backend: s3\n  s3:\n    bucket: b\n    region: \"\"\n",
        "storage:\n  backend: s3\n  s3:\n    bucket: b\n    region: r\n    access_key: only-half\n",
        "metadata:\n  backend: redis\n  redis:\n    redis_url: \"\"\n",
        "imaging:\n  target_widths:\n    small: 0\n",
        "imaging:\n  target_widths:\n    medium: 2000\n",
        "imaging:\n  watermark_alpha: 1.5\n",
        "imaging:\n  watermark_width_fraction: 0\n",
        "imaging:\n  id_utc_offset_hours: -13\n",
        "server:\n  threads: 0\n",
    ];

    for yaml in cases {
        let config = load(yaml).unwrap();
        assert!(config.validate().is_err(), "expected rejection for:\n{}", yaml);
    }
}

// Test: malformed YAML fails to load
#[test]
fn test_malformed_yaml() {
    assert!(load("server: [unclosed").is_err());
    assert!(load("storage:\n  backend: ftp\n").is_err());
}

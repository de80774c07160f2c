// Pipeline tests: upload, resize, watermark with fallback, retrieval

use base64::{engine::general_purpose::STANDARD, Engine};
use image::Rgba;
use regex::Regex;

use imgvariant::error::ServiceError;
use imgvariant::imaging::{decode_image, SizeLabel};
use imgvariant::lineage::{ArtifactKind, RecordKey};
use imgvariant::metadata::MetadataStore;
use imgvariant::storage::ArtifactStore;

use super::support::{bare_harness, black_upload, harness, png_bytes};

// Test: upload of a 600x400 image writes the original and its root record
#[tokio::test]
async fn test_upload_creates_root_record_and_artifact() {
    let h = harness().await;

    let outcome = h.pipeline.upload(&black_upload(600, 400)).await.unwrap();

    let id_pattern = Regex::new(r"^image_\d{8}_\d{6}$").unwrap();
    assert!(id_pattern.is_match(&outcome.image_id), "{}", outcome.image_id);
    assert_eq!(outcome.path, format!("{}.jpg", outcome.image_id));
    assert_eq!(
        outcome.status,
        format!("{} uploaded successfully", outcome.image_id)
    );

    let record = h
        .metadata
        .get(&RecordKey::original(&outcome.image_id).document_path())
        .await
        .unwrap();
    assert_eq!(record.kind, ArtifactKind::Original);
    assert_eq!(record.description, "Image uploaded successfully!");
    assert_eq!(record.path, outcome.path);
    assert!(record.parent_id.is_none());

    let stored = h.artifacts.get(&record.path).await.unwrap();
    assert_eq!(stored.content_type, "image/jpeg");
    assert_eq!(decode_image(&stored.data).unwrap().dimensions(), (600, 400));
}

// Test: data URL prefix is accepted on upload
#[tokio::test]
async fn test_upload_accepts_data_url() {
    let h = harness().await;
    let payload = format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png_bytes(10, 10, Rgba([1, 2, 3, 255])))
    );

    let outcome = h.pipeline.upload_as("image_data_url", &payload).await.unwrap();
    assert_eq!(outcome.path, "image_data_url.jpg");
}

// Test: undecodable uploads fail with a decode error and store nothing
#[tokio::test]
async fn test_upload_rejects_bad_payloads() {
    let h = harness().await;
    let artifacts_before = h.artifacts.len();

    let err = h.pipeline.upload_as("image_bad", "@@@").await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));

    let not_an_image = STANDARD.encode(b"plain text, not pixels");
    let err = h
        .pipeline
        .upload_as("image_bad", &not_an_image)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));
    assert_eq!(err.to_http_status(), 500);

    assert_eq!(h.artifacts.len(), artifacts_before);
    assert!(h.metadata.is_empty());
}

// Test: Resize(id, large) on 2000x1000 produces 1500x750 with a Path
#[tokio::test]
async fn test_resize_large_preserves_aspect_ratio() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_wide", &black_upload(2000, 1000))
        .await
        .unwrap();

    let outcome = h
        .pipeline
        .resize("image_wide", SizeLabel::Large)
        .await
        .unwrap();
    assert_eq!(outcome.status, "image_wide resized to large successfully");
    assert_eq!(outcome.path, "resized/large_image_wide.jpg");

    let record = h
        .metadata
        .get(&RecordKey::resized("image_wide", SizeLabel::Large).document_path())
        .await
        .unwrap();
    assert_eq!(record.path, "resized/large_image_wide.jpg");
    assert_eq!(record.size, Some(SizeLabel::Large));
    assert_eq!(record.parent_id.as_deref(), Some("image_wide"));

    let stored = h.artifacts.get(&record.path).await.unwrap();
    assert_eq!(decode_image(&stored.data).unwrap().dimensions(), (1500, 750));
}

// Test: every size label resizes to its configured width
#[tokio::test]
async fn test_resize_all_sizes() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_sizes", &black_upload(640, 480))
        .await
        .unwrap();

    for (size, expected) in [
        (SizeLabel::Small, (100, 75)),
        (SizeLabel::Medium, (500, 375)),
        (SizeLabel::Large, (1500, 1125)),
    ] {
        h.pipeline.resize("image_sizes", size).await.unwrap();
        let stored = h.pipeline.fetch_variant("image_sizes", size).await.unwrap();
        assert_eq!(decode_image(&stored.data).unwrap().dimensions(), expected);
    }
}

// Test: re-running Resize overwrites without error
#[tokio::test]
async fn test_resize_is_repeatable() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_again", &black_upload(300, 200))
        .await
        .unwrap();

    h.pipeline
        .resize("image_again", SizeLabel::Small)
        .await
        .unwrap();
    let records = h.metadata.len();
    let artifacts = h.artifacts.len();

    h.pipeline
        .resize("image_again", SizeLabel::Small)
        .await
        .unwrap();
    assert_eq!(h.metadata.len(), records);
    assert_eq!(h.artifacts.len(), artifacts);
}

// Test: Resize requires the root record to exist
#[tokio::test]
async fn test_resize_unknown_image_is_not_found() {
    let h = harness().await;
    let err = h
        .pipeline
        .resize("image_missing", SizeLabel::Small)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("posts/image_missing"));
}

// Test: empty image ids are validation errors
#[tokio::test]
async fn test_empty_image_id_is_rejected() {
    let h = harness().await;
    let err = h.pipeline.resize("", SizeLabel::Small).await.unwrap_err();
    assert_eq!(err.to_http_status(), 400);

    let err = h
        .pipeline
        .ensure_watermarked(" ", SizeLabel::Small)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

// Test: Watermark(id, medium) before Resize runs the fallback and writes both records
#[tokio::test]
async fn test_watermark_fallback_resizes_first() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_fallback", &black_upload(600, 400))
        .await
        .unwrap();

    let outcome = h
        .pipeline
        .ensure_watermarked("image_fallback", SizeLabel::Medium)
        .await
        .unwrap();

    assert!(outcome.resized_first);
    assert_eq!(
        outcome.status,
        "image_fallback resized to medium and watermarked successfully after watermarking failed"
    );

    let resized = RecordKey::resized("image_fallback", SizeLabel::Medium);
    let watermarked = RecordKey::watermarked("image_fallback", SizeLabel::Medium);
    assert!(h.metadata.exists(&resized.document_path()).await.unwrap());

    let record = h.metadata.get(&watermarked.document_path()).await.unwrap();
    assert_eq!(record.kind, ArtifactKind::Watermarked);
    assert_eq!(record.id, "watermarked_medium");
    assert_eq!(
        record.path,
        "watermarked/medium_watermarked_image_fallback.jpg"
    );
}

// Test: Watermark on an existing resized variant takes the direct path
#[tokio::test]
async fn test_watermark_direct_path() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_direct", &black_upload(600, 400))
        .await
        .unwrap();
    h.pipeline
        .resize("image_direct", SizeLabel::Medium)
        .await
        .unwrap();

    let outcome = h
        .pipeline
        .ensure_watermarked("image_direct", SizeLabel::Medium)
        .await
        .unwrap();

    assert!(!outcome.resized_first);
    assert_eq!(
        outcome.status,
        "medium_watermarked_image_direct.jpg saved successfully"
    );
}

// Test: watermarked output keeps the resized dimensions and shows the tiles
#[tokio::test]
async fn test_watermarked_pixels() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_pixels", &black_upload(600, 400))
        .await
        .unwrap();
    h.pipeline
        .ensure_watermarked("image_pixels", SizeLabel::Medium)
        .await
        .unwrap();

    let stored = h
        .pipeline
        .fetch_watermarked("image_pixels", SizeLabel::Medium)
        .await
        .unwrap();
    assert_eq!(stored.content_type, "image/jpeg");

    // 500x333 base: two 100x50 tiles at (100, 141) and (300, 141)
    let decoded = decode_image(&stored.data).unwrap().image.to_rgba8();
    assert_eq!(decoded.dimensions(), (500, 333));
    assert!(decoded.get_pixel(150, 166)[0] > 120);
    assert!(decoded.get_pixel(350, 166)[0] > 120);
    assert!(decoded.get_pixel(10, 10)[0] < 40);
    assert!(decoded.get_pixel(250, 300)[0] < 40);
}

// Test: a failing sub-step names the step in the error
#[tokio::test]
async fn test_fallback_errors_name_the_step() {
    let h = bare_harness();

    let err = h
        .pipeline
        .ensure_watermarked("image_nowhere", SizeLabel::Small)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("resize step failed"));

    h.pipeline
        .upload_as("image_no_asset", &black_upload(300, 200))
        .await
        .unwrap();
    let err = h
        .pipeline
        .ensure_watermarked("image_no_asset", SizeLabel::Small)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("watermark step failed"));
    assert!(err.to_string().contains("has not been provisioned"));

    // The resize phase still completed before the watermark step failed
    assert!(h
        .metadata
        .exists(&RecordKey::resized("image_no_asset", SizeLabel::Small).document_path())
        .await
        .unwrap());
}

// Test: fetching a variant that was never produced is not found
#[tokio::test]
async fn test_fetch_missing_variant() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_fetch", &black_upload(50, 50))
        .await
        .unwrap();

    let err = h
        .pipeline
        .fetch_variant("image_fetch", SizeLabel::Small)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = h
        .pipeline
        .fetch_watermarked("image_fetch", SizeLabel::Small)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// Test: uploading a watermark asset stores a PNG and an asset record
#[tokio::test]
async fn test_upload_watermark_asset() {
    let h = bare_harness();
    let payload = STANDARD.encode(png_bytes(40, 20, Rgba([255, 0, 0, 128])));

    let outcome = h
        .pipeline
        .upload_watermark("logo.png", &payload)
        .await
        .unwrap();
    assert_eq!(outcome.status, "Watermark image logo.png uploaded successfully");
    assert_eq!(outcome.path, "assets/logo.png");

    let stored = h.artifacts.get("assets/logo.png").await.unwrap();
    assert_eq!(stored.content_type, "image/png");

    let record = h
        .metadata
        .get(&RecordKey::asset("logo.png").document_path())
        .await
        .unwrap();
    assert_eq!(record.kind, ArtifactKind::Asset);

    let image = h.pipeline.assets().load("logo.png").await.unwrap();
    assert_eq!((image.width(), image.height()), (40, 20));
}

// Test: replacing the active watermark asset takes effect immediately
#[tokio::test]
async fn test_upload_watermark_replaces_cached_asset() {
    let h = harness().await;
    let before = h.pipeline.assets().load_default().await.unwrap();
    assert_eq!(before.width(), 200);

    let payload = STANDARD.encode(png_bytes(64, 64, Rgba([0, 255, 0, 255])));
    h.pipeline
        .upload_watermark("Icares_Logo.png", &payload)
        .await
        .unwrap();

    let after = h.pipeline.assets().load_default().await.unwrap();
    assert_eq!(after.width(), 64);
}

// Test: watermark asset names are validated
#[tokio::test]
async fn test_upload_watermark_requires_name() {
    let h = bare_harness();
    let payload = STANDARD.encode(png_bytes(4, 4, Rgba([0, 0, 0, 255])));

    let err = h.pipeline.upload_watermark("", &payload).await.unwrap_err();
    assert_eq!(err, ServiceError::validation("Image name is required"));

    let err = h
        .pipeline
        .upload_watermark("../escape.png", &payload)
        .await
        .unwrap_err();
    assert_eq!(err.to_http_status(), 400);
}

// Test: a MIME-wrapped (76 columns, CRLF) payload uploads like a plain one
#[tokio::test]
async fn test_upload_accepts_line_wrapped_base64() {
    let h = harness().await;
    let plain = black_upload(64, 48);
    let wrapped = plain
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n");

    let outcome = h.pipeline.upload_as("image_wrapped", &wrapped).await.unwrap();
    let stored = h.artifacts.get(&outcome.path).await.unwrap();
    assert_eq!(decode_image(&stored.data).unwrap().dimensions(), (64, 48));
}

// Test: transparent pixels of an upload are stored black, not with their hidden color
#[tokio::test]
async fn test_upload_flattens_transparency_onto_black() {
    let h = harness().await;
    let clear_white = STANDARD.encode(png_bytes(32, 32, Rgba([255, 255, 255, 0])));

    let outcome = h.pipeline.upload_as("image_clear", &clear_white).await.unwrap();
    let stored = h.artifacts.get(&outcome.path).await.unwrap();
    let decoded = decode_image(&stored.data).unwrap().image.to_rgb8();
    assert!(decoded.get_pixel(16, 16).0.iter().all(|&c| c < 8));
}

// Test: a narrow, tall upload cannot be resized into an enormous buffer
#[tokio::test]
async fn test_resize_rejects_target_beyond_limits() {
    let h = harness().await;
    h.pipeline
        .upload_as("image_sliver", &black_upload(20, 933))
        .await
        .unwrap();

    let err = h
        .pipeline
        .resize("image_sliver", SizeLabel::Large)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(err.to_string().contains("exceed limits"));

    assert!(!h
        .metadata
        .exists(&RecordKey::resized("image_sliver", SizeLabel::Large).document_path())
        .await
        .unwrap());

    // 100x4665 stays within the limits
    h.pipeline
        .resize("image_sliver", SizeLabel::Small)
        .await
        .unwrap();
}

//! Reading captured photos from disk into upload payloads.

use calcula_core::capture::{CapturedPhoto, guess_image_mime};
use calcula_core::error::{CalculaError, Result};
use calcula_core::price::{
    MAX_CAPTURE_QUANTITY, MIN_CAPTURE_QUANTITY, PhotoUpload, clamp_capture_quantity,
};
use std::path::{Path, PathBuf};

/// Reads an image file and prepares it for upload.
///
/// The mime type is guessed from the extension (JPEG when unknown). A
/// quantity outside the capture range is clamped, with a warning.
pub async fn load_photo(path: &Path, quantity: u32) -> Result<PhotoUpload> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        CalculaError::validation("file", format!("Cannot read {}: {}", path.display(), e))
    })?;
    if bytes.is_empty() {
        return Err(CalculaError::validation(
            "file",
            format!("{} is empty", path.display()),
        ));
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("capture-{}.jpg", chrono::Utc::now().timestamp_millis()));
    let mime_type = guess_image_mime(&filename);

    let clamped = clamp_capture_quantity(quantity as i64);
    if clamped != quantity {
        tracing::warn!(
            "[PhotoFile] Quantity {} is outside {}..={}, sending {}",
            quantity,
            MIN_CAPTURE_QUANTITY,
            MAX_CAPTURE_QUANTITY,
            clamped
        );
    }

    Ok(PhotoUpload::new(bytes)
        .with_filename(filename)
        .with_mime_type(mime_type)
        .with_quantity(clamped))
}

/// Reads a photo handed over by the capture collaborator.
///
/// `file://` URIs and plain paths are supported. The collaborator's filename
/// and mime type win over anything guessed from the path.
pub async fn load_captured(photo: &CapturedPhoto, quantity: u32) -> Result<PhotoUpload> {
    let path = uri_to_path(&photo.uri);
    let upload = load_photo(&path, quantity).await?;
    Ok(upload
        .with_filename(photo.filename.clone())
        .with_mime_type(photo.mime_type.clone()))
}

fn uri_to_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

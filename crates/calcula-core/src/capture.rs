//! Result of a camera or image-picker interaction.

use serde::{Deserialize, Serialize};

/// Mime type used when a filename gives no usable image type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Guesses an image mime type from a filename. Non-image or unknown
/// extensions fall back to `image/jpeg`.
pub fn guess_image_mime(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
}

/// A photo the capture collaborator produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPhoto {
    pub uri: String,
    pub filename: String,
    pub mime_type: String,
}

/// Outcome of a capture attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaptureOutcome {
    Ok(CapturedPhoto),
    Cancelled,
    Failed { reason: String },
}

impl CaptureOutcome {
    /// Builds an outcome from a captured URI, deriving filename and mime type
    /// from its last path segment.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Self::Failed {
                reason: "The image could not be captured.".to_string(),
            };
        }
        let filename = uri
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("photo.jpg")
            .to_string();
        let mime_type = guess_image_mime(&filename);
        Self::Ok(CapturedPhoto {
            uri,
            filename,
            mime_type,
        })
    }

    pub fn photo(&self) -> Option<&CapturedPhoto> {
        match self {
            Self::Ok(photo) => Some(photo),
            _ => None,
        }
    }
}

//! Request payloads for price mutations and photo transfers.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PHOTO_FILENAME: &str = "photo.jpg";
pub const DEFAULT_PHOTO_MIME_TYPE: &str = "image/jpeg";

/// A validated manual price entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrice {
    pub quantity: u32,
    pub name: String,
    pub value: f64,
}

/// A validated edit of an existing price item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub price_id: String,
    #[serde(flatten)]
    pub price: NewPrice,
}

/// Binary image plus the quantity it stands for.
#[derive(Clone, PartialEq)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub quantity: u32,
}

impl PhotoUpload {
    /// Creates an upload with the default filename, JPEG mime type and quantity 1.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: DEFAULT_PHOTO_FILENAME.to_string(),
            mime_type: DEFAULT_PHOTO_MIME_TYPE.to_string(),
            quantity: 1,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

// Image bytes are not worth printing.
impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("quantity", &self.quantity)
            .finish()
    }
}

/// A stored item photo, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePhoto {
    /// `data:` URI with the base64-encoded image
    pub uri: String,
    pub content_type: String,
}

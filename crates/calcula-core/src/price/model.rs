//! Price item domain models.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Smallest quantity accepted by the photo capture flow.
pub const MIN_CAPTURE_QUANTITY: u32 = 1;
/// Largest quantity accepted by the photo capture flow.
pub const MAX_CAPTURE_QUANTITY: u32 = 99;

/// Lifecycle of a price item on the server.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceStatus {
    /// Awaiting server-side processing (e.g. OCR of an uploaded photo).
    Pending,
    /// Name and value are usable.
    Ready,
    /// Processing failed; the item stays visible with an error marker.
    Failed,
    /// Any status this client does not know about. Rendered like `Failed`.
    #[serde(other)]
    Unknown,
}

impl PriceStatus {
    /// True when the row should render with an error marker.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::Unknown)
    }
}

/// One priced line in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceItem {
    /// Server-assigned identifier
    pub id: String,
    /// Free-text description, null until processed
    #[serde(default)]
    pub name: Option<String>,
    /// Monetary amount, null while pending
    #[serde(default)]
    pub value: Option<f64>,
    /// Units; tolerant of floats, numeric strings and negatives on the wire
    #[serde(default, deserialize_with = "deserialize_quantity")]
    pub quantity: u32,
    pub status: PriceStatus,
}

impl PriceItem {
    pub fn is_pending(&self) -> bool {
        self.status == PriceStatus::Pending
    }

    /// Name to show, or an empty string while the server has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Value to show. Failed and pending items never show one.
    pub fn display_value(&self) -> Option<f64> {
        match self.status {
            PriceStatus::Ready => self.value,
            _ => None,
        }
    }

    /// `Ready` items must carry a non-null, non-negative value.
    pub fn has_usable_value(&self) -> bool {
        matches!(self.value, Some(v) if v.is_finite() && v >= 0.0)
    }
}

/// Reads a quantity the server may send as `2`, `2.0` or `"2"`.
///
/// Fractions round to the nearest unit, negatives become 0, and null or
/// unreadable values become 0 so one odd row never rejects the snapshot.
fn deserialize_quantity<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let units = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if !units.is_finite() || units <= 0.0 {
        return Ok(0);
    }
    Ok(units.round().min(u32::MAX as f64) as u32)
}

/// Clamps a capture quantity into the range offered by the capture screen.
pub fn clamp_capture_quantity(quantity: i64) -> u32 {
    quantity.clamp(MIN_CAPTURE_QUANTITY as i64, MAX_CAPTURE_QUANTITY as i64) as u32
}

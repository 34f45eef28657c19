//! Session domain models.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CalculaError, Result};
use crate::price::PriceItem;

/// Opaque session token, created by the server or handed over by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a server-issued identifier as-is.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accepts an identifier supplied by a peer (QR code, share link).
    ///
    /// Any non-empty string is accepted verbatim, whitespace included; a bad
    /// token only surfaces on the next API call.
    pub fn from_peer(input: impl Into<String>) -> Result<Self> {
        let input = input.into();
        if input.is_empty() {
            return Err(CalculaError::validation(
                "session",
                "The scanned session code is empty.",
            ));
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Last known server state of a session.
///
/// `total` is computed by the server and never recomputed here. `prices` keeps
/// the server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub total: f64,
    #[serde(default)]
    pub prices: Vec<PriceItem>,
}

impl SessionSnapshot {
    pub fn find_price(&self, price_id: &str) -> Option<&PriceItem> {
        self.prices.iter().find(|p| p.id == price_id)
    }

    /// Removes an item in place. Returns whether anything was removed.
    pub fn remove_price(&mut self, price_id: &str) -> bool {
        let before = self.prices.len();
        self.prices.retain(|p| p.id != price_id);
        self.prices.len() != before
    }

    /// Copy of the snapshot without the given item.
    pub fn without_price(&self, price_id: &str) -> Self {
        let mut next = self.clone();
        next.remove_price(price_id);
        next
    }

    pub fn pending_count(&self) -> usize {
        self.prices.iter().filter(|p| p.is_pending()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

//! Remote session API trait.

use async_trait::async_trait;

use super::model::{SessionId, SessionSnapshot};
use crate::error::Result;
use crate::price::{NewPrice, PhotoUpload, PricePhoto, PriceUpdate};

/// The remote API that owns sessions and their prices.
///
/// The server is the single source of truth for `total` and item order.
/// Mutating calls that get an empty success body must fetch the canonical
/// snapshot rather than synthesize one.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Creates a new session and returns its identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionId)`: Session created
    /// - `Err(Api)`: Non-2xx response
    /// - `Err(Protocol)`: Success body without an `id`
    async fn create_session(&self) -> Result<SessionId>;

    /// Fetches the current snapshot of a session.
    async fn get_session(&self, session_id: &SessionId) -> Result<SessionSnapshot>;

    /// Adds a manually entered price.
    async fn create_price(&self, session_id: &SessionId, price: &NewPrice)
    -> Result<SessionSnapshot>;

    /// Edits an existing price.
    async fn update_price(
        &self,
        session_id: &SessionId,
        update: &PriceUpdate,
    ) -> Result<SessionSnapshot>;

    /// Uploads a photo to be turned into a price server-side.
    async fn upload_price_image(
        &self,
        session_id: &SessionId,
        upload: &PhotoUpload,
    ) -> Result<SessionSnapshot>;

    /// Deletes a price. Any 2xx counts as success.
    async fn delete_price(&self, session_id: &SessionId, price_id: &str) -> Result<()>;

    /// Fetches the photo stored for a price.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(photo))`: Photo found
    /// - `Ok(None)`: The item has no photo (404 or empty body)
    /// - `Err(_)`: Any other failure
    async fn get_price_photo(
        &self,
        session_id: &SessionId,
        price_id: &str,
    ) -> Result<Option<PricePhoto>>;
}

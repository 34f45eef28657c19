//! Durable storage of the current session identifier.

use async_trait::async_trait;

use super::model::SessionId;
use crate::error::Result;

/// Key-value record holding the current session identifier.
///
/// Absence of a record means "no session yet".
#[async_trait]
pub trait SessionIdRepository: Send + Sync {
    /// Reads the persisted identifier, if any.
    async fn load(&self) -> Result<Option<SessionId>>;

    /// Persists the identifier, replacing any previous one.
    async fn save(&self, session_id: &SessionId) -> Result<()>;

    /// Removes the persisted identifier.
    async fn clear(&self) -> Result<()>;
}

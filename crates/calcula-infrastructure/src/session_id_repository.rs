//! TOML-backed storage of the current session identifier.

use crate::paths::CalculaPaths;
use crate::storage::TomlRecordFile;
use async_trait::async_trait;
use calcula_core::error::{CalculaError, Result};
use calcula_core::session::{SessionId, SessionIdRepository};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// On-disk shape of `session.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    session_id: String,
    updated_at: String,
}

/// Persists the session identifier to `session.toml`.
///
/// File I/O runs on the blocking pool so callers on the async runtime never
/// stall on disk.
#[derive(Clone)]
pub struct TomlSessionIdRepository {
    file: Arc<TomlRecordFile<SessionRecord>>,
}

impl TomlSessionIdRepository {
    /// Uses the session file from the given path layout.
    pub fn new(paths: &CalculaPaths) -> Result<Self> {
        Ok(Self::with_path(paths.session_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(TomlRecordFile::new(path)),
        }
    }

    async fn run_blocking<R, F>(&self, op: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&TomlRecordFile<SessionRecord>) -> Result<R> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || op(&file))
            .await
            .map_err(|e| CalculaError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[async_trait]
impl SessionIdRepository for TomlSessionIdRepository {
    async fn load(&self) -> Result<Option<SessionId>> {
        let record = self.run_blocking(|file| file.load()).await?;
        Ok(record
            .map(|r| r.session_id)
            .filter(|id| !id.trim().is_empty())
            .map(SessionId::new))
    }

    async fn save(&self, session_id: &SessionId) -> Result<()> {
        let record = SessionRecord {
            session_id: session_id.to_string(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        };
        tracing::debug!("[SessionIdRepository] Persisting session id {}", session_id);
        self.run_blocking(move |file| file.save(&record)).await
    }

    async fn clear(&self) -> Result<()> {
        tracing::debug!("[SessionIdRepository] Clearing persisted session id");
        self.run_blocking(|file| file.remove()).await
    }
}

//! Configuration service implementation.
//!
//! Loads the client configuration from `config.toml` in the config directory
//! and lets the environment override the API base URL.

use crate::paths::CalculaPaths;
use crate::storage::TomlRecordFile;
use calcula_core::config::ClientConfig;
use calcula_core::error::Result;
use std::sync::{Arc, RwLock};

/// Environment variables checked, in order, for the API base URL.
pub const API_URL_ENV_VARS: [&str; 2] = ["CALCULA_API_URL", "API_URL"];

/// Configuration service that loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: CalculaPaths,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a new ConfigService. The file is read lazily on first access.
    pub fn new(paths: CalculaPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing or unreadable file yields the defaults; the environment
    /// override is applied on top either way.
    pub fn get_config(&self) -> ClientConfig {
        if let Ok(read_lock) = self.config.read()
            && let Some(cached) = read_lock.as_ref()
        {
            return cached.clone();
        }

        let mut loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] Falling back to defaults: {}", e);
                ClientConfig::default()
            }
        };
        if let Some(url) = Self::api_url_from_env() {
            loaded.api_url = Some(url);
        }

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Writes the configuration back to `config.toml`.
    pub fn save_config(&self, config: &ClientConfig) -> Result<()> {
        let file = TomlRecordFile::<ClientConfig>::new(self.paths.config_file()?);
        file.save(config)?;
        self.invalidate_cache();
        Ok(())
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let file = TomlRecordFile::<ClientConfig>::new(self.paths.config_file()?);
        Ok(file.load()?.unwrap_or_default())
    }

    fn api_url_from_env() -> Option<String> {
        API_URL_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // The env override is process-global, so these tests only assert on fields
    // it never touches.

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::new(CalculaPaths::new(Some(dir.path().to_path_buf())));
        let config = service.get_config();
        assert_eq!(config.poll_interval_ms, 3000);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_reads_file_and_caches() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "api_url = \"https://api.example.com\"\npoll_interval_ms = 5000\n",
        )
        .unwrap();
        let service = ConfigService::new(CalculaPaths::new(Some(dir.path().to_path_buf())));
        assert_eq!(service.get_config().poll_interval_ms, 5000);

        // cached until invalidated
        std::fs::write(dir.path().join("config.toml"), "poll_interval_ms = 1000\n").unwrap();
        assert_eq!(service.get_config().poll_interval_ms, 5000);
        service.invalidate_cache();
        assert_eq!(service.get_config().poll_interval_ms, 1000);
    }

    #[test]
    fn test_save_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::new(CalculaPaths::new(Some(dir.path().to_path_buf())));
        let config = ClientConfig {
            request_timeout_secs: 12,
            ..Default::default()
        };
        service.save_config(&config).unwrap();
        assert_eq!(service.get_config().request_timeout_secs, 12);
    }
}

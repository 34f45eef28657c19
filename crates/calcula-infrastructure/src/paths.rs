//! Path management for Calcula's local files.
//!
//! ```text
//! ~/.config/calcula/           # Config directory
//! ├── config.toml              # Client configuration (API URL, intervals)
//! ├── session.toml             # Current session identifier
//! └── logs/                    # Application logs
//!     └── calcula.log.YYYY-MM-DD
//! ```

use calcula_core::error::{CalculaError, Result};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "calcula";

/// Resolves where Calcula keeps its files.
///
/// A base directory override (tests, `--config-dir`) replaces the platform
/// config directory entirely.
#[derive(Debug, Clone, Default)]
pub struct CalculaPaths {
    base_override: Option<PathBuf>,
}

impl CalculaPaths {
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self { base_override }
    }

    /// Returns the configuration directory (e.g. `~/.config/calcula/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| CalculaError::config("Cannot find config directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Durable record of the current session identifier.
    pub fn session_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("session.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("logs"))
    }

    pub fn base_override(&self) -> Option<&Path> {
        self.base_override.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dir() {
        // No home directory in some CI sandboxes
        if let Ok(config_dir) = CalculaPaths::default().config_dir() {
            assert!(config_dir.ends_with("calcula"));
        }
    }

    #[test]
    fn test_override_layout() {
        let paths = CalculaPaths::new(Some(PathBuf::from("/tmp/calcula-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/calcula-test/config.toml")
        );
        assert_eq!(
            paths.session_file().unwrap(),
            PathBuf::from("/tmp/calcula-test/session.toml")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/calcula-test/logs")
        );
    }
}

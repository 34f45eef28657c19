//! Error types for the Calcula client.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the whole client.
///
/// Variants follow where an error is detected: client-side validation,
/// the HTTP boundary, local storage, or local coordination.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum CalculaError {
    /// Malformed user input. Never reaches the network.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Non-2xx HTTP response.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body breaks the expected contract.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Request could not be sent or its body could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Durable storage read/write error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The same kind of mutation is already in flight.
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CalculaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error for the given form field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Creates an Api error
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::Busy(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is an Api error, optionally with a specific status
    pub fn is_api_status(&self, expected: u16) -> bool {
        matches!(self, Self::Api { status, .. } if *status == expected)
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    /// Text shown to the user in a banner or alert.
    ///
    /// API errors show the raw response body when the server sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Api { status, body } if body.trim().is_empty() => {
                format!("Request failed with status {}", status)
            }
            Self::Api { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CalculaError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for CalculaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(format!("invalid JSON: {}", err))
    }
}

impl From<toml::de::Error> for CalculaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Storage(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for CalculaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Storage(format!("TOML serialization error: {}", err))
    }
}

/// A type alias for `Result<T, CalculaError>`.
pub type Result<T> = std::result::Result<T, CalculaError>;

//! Domain layer for the Calcula session client.
//!
//! Holds the data model, the error type, input parsing and the traits the
//! infrastructure layer implements (`SessionApi`, `SessionIdRepository`).

pub mod capture;
pub mod config;
pub mod error;
pub mod parsing;
pub mod price;
pub mod session;

// Re-export common error type
pub use error::{CalculaError, Result};

//! Error types for the scenario runner
//!
//! Messages name the step and the offending value so a failed run can be
//! diagnosed from the terminal output alone.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apiflow
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to parse scenario '{path}': {message}")]
    ScenarioParse { path: String, message: String },

    #[error("Unknown built-in scenario '{name}'. Available: {available}")]
    UnknownBuiltin { name: String, available: String },

    // === Transport Errors ===
    #[error("{method} {url} failed: {message}")]
    Http {
        method: String,
        url: String,
        message: String,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // === Identifier Errors ===
    #[error("Step {step} references {{id}} but no identifier has been captured yet. Add `capture` to an earlier step")]
    IdentifierUnset { step: usize },

    #[error("Identifier already captured as '{existing}'; a scenario captures exactly once")]
    IdentifierAlreadySet { existing: String },

    #[error("Could not capture identifier from field '{field}': {reason}")]
    CaptureFailed { field: String, reason: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),
}

impl Error {
    /// Create a transport error for a request
    pub fn http(method: &str, url: &str, message: impl ToString) -> Self {
        Self::Http {
            method: method.to_string(),
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a capture failure for a response field
    pub fn capture_failed(field: &str, reason: &str) -> Self {
        Self::CaptureFailed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from an assertion rather than the environment
    ///
    /// Used to label step failures in the log.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::TestAssertion(_))
    }
}

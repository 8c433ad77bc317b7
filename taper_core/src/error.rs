//! Error types for the taper_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for taper_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration could not be serialized or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted plan is unreadable or violates the store invariants
    #[error("Plan state error: {0}")]
    State(String),

    /// Weather or activity provider failed (transport, auth, payload)
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    Other(String),
}

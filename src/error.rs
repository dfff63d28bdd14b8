//! Error types for the karat crate

use thiserror::Error;

/// Result type for karat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for karat operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Product page extraction error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Page discovery or fetching error
    #[error("Spider error: {0}")]
    Spider(String),

    /// Feed or images pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

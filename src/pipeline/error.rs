//! Error types for the pipeline module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for feed and image pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV feed writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<PipelineError> for CrateError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Http(e) => CrateError::Http(e),
            PipelineError::Io(e) => CrateError::Io(e),
            PipelineError::Csv(e) => CrateError::Pipeline(e.to_string()),
        }
    }
}

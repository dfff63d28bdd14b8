//! Error types for the spider module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for page discovery and fetching
#[derive(Debug, Error)]
pub enum SpiderError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Sitemap XML parsing error
    #[error("sitemap XML error: {0}")]
    Xml(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Unknown site requested
    #[error("no spider registered for site '{0}'")]
    UnknownSite(String),

    /// Task join error
    #[error("task join error: {0}")]
    TaskJoin(String),
}

impl From<quick_xml::Error> for SpiderError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<SpiderError> for CrateError {
    fn from(err: SpiderError) -> Self {
        match err {
            SpiderError::Http(e) => CrateError::Http(e),
            _ => CrateError::Spider(err.to_string()),
        }
    }
}

//! Error types for the parser module

use crate::error::Error as CrateError;
use crate::jewel::Field;
use crate::processors::ProcessorError;
use thiserror::Error;

/// Error type for extraction of a single product page
#[derive(Debug, Error)]
pub enum ParseError {
    /// Value processing error (empty reduction or numeric coercion)
    #[error("value processing error: {0}")]
    Processor(#[from] ProcessorError),

    /// A CSS selector failed to parse
    #[error("selector error: {0}")]
    Selector(String),

    /// A mandatory field has no handler and the policy denies that
    #[error("no handler for mandatory field '{0}'")]
    MissingHandler(Field),

    /// A gem insert block is missing a required sub-property
    #[error("gem insert error: {0}")]
    GemInsert(String),
}

impl From<ParseError> for CrateError {
    fn from(err: ParseError) -> Self {
        CrateError::Parse(err.to_string())
    }
}

//! Schema-driven extraction contract
//!
//! This module defines the seam between the fixed jewel schema and
//! site-specific markup knowledge. An adapter implements `JewelParser`
//! for one site: it declares the fields it can extract, provides one
//! handler per declared field and optionally a prelude pass for values
//! that are cheaper to extract jointly. The `parse_jewel` driver owns
//! the assembly logic so adapters never reimplement it.

mod error;
pub mod sokolov_ru;

pub use error::ParseError;

use tracing::debug;

use crate::jewel::{Field, Jewel};
use crate::loader::JewelLoader;

/// What the driver does when a mandatory field has no handler.
///
/// The base contract tolerates missing handlers (the field is simply
/// absent from the record); integrators that treat adapter completeness
/// as a deployment invariant can opt into `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Missing handlers leave the field absent (default).
    #[default]
    Allow,
    /// A mandatory field without a handler fails the extraction.
    Deny,
}

/// Site-specific extraction logic for one parsed product page.
///
/// Implementations bind the parsed document (and any pre-selected
/// regions of it) at construction time; handlers read that state and
/// push raw values into the loader they are given.
pub trait JewelParser {
    /// The fields this adapter provides handlers for.
    ///
    /// Declaring a field here is a capability claim: `extract` must
    /// accept it, even if only as an explicit no-op for fields already
    /// populated by the prelude pass.
    fn fields(&self) -> &[Field];

    /// Run the handler for one declared field, pushing zero or more
    /// raw values into the loader.
    fn extract(&self, field: Field, loader: &mut JewelLoader) -> Result<(), ParseError>;

    /// Joint extraction passes that must run before per-field dispatch,
    /// e.g. scanning a shared property list that feeds several fields.
    fn prelude(&self, loader: &mut JewelLoader) -> Result<(), ParseError> {
        let _ = loader;
        Ok(())
    }

    /// The loader this adapter's values go through. Override to attach
    /// per-field output-processor overrides.
    fn loader(&self) -> JewelLoader {
        JewelLoader::new()
    }
}

/// Drive one extraction pass over a parsed document.
///
/// Runs the adapter's prelude, then dispatches every schema field in
/// declaration order to the adapter's handler if one is declared, and
/// finally reduces the loader into the finished record. Extraction is
/// synchronous and touches nothing outside the loader, so independent
/// documents can be parsed from parallel workers without coordination.
pub fn parse_jewel<P>(parser: &P, policy: MissingFieldPolicy) -> Result<Jewel, ParseError>
where
    P: JewelParser + ?Sized,
{
    let mut loader = parser.loader();

    parser.prelude(&mut loader)?;

    for field in Field::ALL {
        if parser.fields().contains(&field) {
            debug!(field = %field, "running field handler");
            parser.extract(field, &mut loader)?;
        } else if policy == MissingFieldPolicy::Deny && field.is_mandatory() {
            return Err(ParseError::MissingHandler(field));
        }
    }

    Ok(loader.load()?)
}

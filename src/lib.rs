//! # karat - Jewelry Catalog Scraping for Rust
//!
//! This crate extracts structured jewelry product records from
//! heterogeneous e-commerce product pages and normalizes them into a
//! uniform schema. The heart of it is a schema-driven extraction
//! engine: a fixed jewel schema, per-field value processors, a record
//! builder and a dispatch contract that lets a site adapter fill the
//! schema field by field without reimplementing assembly logic.
//!
//! ## Features
//!
//! - Fixed jewel schema shared by every site adapter
//! - Per-field value processing (numeric coercion, take-first and
//!   take-max reduction)
//! - `JewelParser` contract: implement only the fields a site exposes
//! - Sitemap-driven product page discovery and concurrent fetching
//! - Image download store and CSV feed output
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use karat::parser::sokolov_ru::SokolovRuParser;
//! use karat::parser::{parse_jewel, MissingFieldPolicy};
//! use scraper::Html;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = std::fs::read_to_string("product.html")?;
//!     let document = Html::parse_document(&html);
//!
//!     let parser = SokolovRuParser::new(&document)?;
//!     let jewel = parse_jewel(&parser, MissingFieldPolicy::Allow)?;
//!
//!     println!("{:?} costs {:?} {:?}", jewel.title, jewel.price, jewel.currency);
//!     Ok(())
//! }
//! ```

mod error;

pub mod config;
pub mod jewel;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod processors;
pub mod spider;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::jewel::{Field, Jewel};
}

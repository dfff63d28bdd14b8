//! Jewel entity schema
//!
//! This module defines the uniform schema that every site adapter fills:
//! the set of named fields, their classification (numeric, list-valued,
//! mandatory) and the finalized `Jewel` record handed to the output
//! pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named slot in the jewel schema.
///
/// Declaration order is significant: the extraction driver dispatches
/// handlers in this order and the feed writer emits columns in this
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Free-form, but sufficiently short jewel title
    Title,
    /// Optional free-form textual description
    Description,
    /// Jewel category, e.g. ring, pendant, bracelet
    Category,
    /// Brand or manufacturer name
    Brand,
    /// Price as a float
    Price,
    /// Currency of the price, e.g. RUB, BYN
    Currency,
    /// Manufacturer's internal identifier
    Sku,
    /// Weight in grams
    Weight,
    /// Width in millimeters
    Width,
    /// Height in millimeters
    Height,
    /// Metal the jewel is made of, e.g. gold, silver
    Metal,
    /// Metal probe, e.g. 375, 585, 925
    Probe,
    /// Target owner type: women, men, children, etc.
    ForWhom,
    /// Textual description of gem inserts, if any
    Gems,
    /// Collection name, if any
    Collection,
    /// Remote image URLs
    ImageUrls,
    /// Local image paths, filled by the images pipeline
    Images,
}

impl Field {
    /// All schema fields in declaration order.
    pub const ALL: [Field; 17] = [
        Field::Title,
        Field::Description,
        Field::Category,
        Field::Brand,
        Field::Price,
        Field::Currency,
        Field::Sku,
        Field::Weight,
        Field::Width,
        Field::Height,
        Field::Metal,
        Field::Probe,
        Field::ForWhom,
        Field::Gems,
        Field::Collection,
        Field::ImageUrls,
        Field::Images,
    ];

    /// Fields every adapter is expected to provide a handler for.
    pub const MANDATORY: [Field; 9] = [
        Field::ImageUrls,
        Field::Title,
        Field::Category,
        Field::Brand,
        Field::Price,
        Field::Currency,
        Field::Sku,
        Field::Metal,
        Field::Probe,
    ];

    /// Snake-case field name used in feeds and logs.
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Category => "category",
            Field::Brand => "brand",
            Field::Price => "price",
            Field::Currency => "currency",
            Field::Sku => "sku",
            Field::Weight => "weight",
            Field::Width => "width",
            Field::Height => "height",
            Field::Metal => "metal",
            Field::Probe => "probe",
            Field::ForWhom => "for_whom",
            Field::Gems => "gems",
            Field::Collection => "collection",
            Field::ImageUrls => "image_urls",
            Field::Images => "images",
        }
    }

    /// Whether raw values for this field are coerced to floats at push time.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Field::Price | Field::Weight | Field::Width | Field::Height
        )
    }

    /// Whether this field holds an ordered list instead of a single value.
    pub fn is_list(self) -> bool {
        matches!(self, Field::ImageUrls | Field::Images)
    }

    /// Whether this field belongs to the mandatory set.
    pub fn is_mandatory(self) -> bool {
        Field::MANDATORY.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finalized record for one product page.
///
/// Absent fields were simply not extracted for this product; list
/// fields are empty rather than absent. Once produced by the loader the
/// record is treated as immutable, except for `images`, which the
/// images pipeline fills after downloads complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jewel {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub metal: Option<String>,
    pub probe: Option<String>,
    pub for_whom: Option<String>,
    pub gems: Option<String>,
    pub collection: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

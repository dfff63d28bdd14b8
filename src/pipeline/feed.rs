//! CSV feed writer
//!
//! Serializes finalized records into the site's `items.csv` feed.
//! Columns follow schema declaration order; list fields are joined
//! with commas inside their cell; an existing feed is overwritten, not
//! appended to.

use std::path::Path;

use tracing::info;

use crate::jewel::{Field, Jewel};
use crate::pipeline::error::PipelineError;

/// Write all records to the feed at `path`, replacing any previous feed.
pub fn write_feed(path: &Path, jewels: &[Jewel]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(Field::ALL.iter().map(|field| field.name()))?;
    for jewel in jewels {
        writer.write_record(Field::ALL.iter().map(|field| cell(jewel, *field)))?;
    }
    writer.flush()?;

    info!("Wrote {} records to {}", jewels.len(), path.display());
    Ok(())
}

fn cell(jewel: &Jewel, field: Field) -> String {
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_default()
    }
    fn number(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    match field {
        Field::Title => text(&jewel.title),
        Field::Description => text(&jewel.description),
        Field::Category => text(&jewel.category),
        Field::Brand => text(&jewel.brand),
        Field::Price => number(jewel.price),
        Field::Currency => text(&jewel.currency),
        Field::Sku => text(&jewel.sku),
        Field::Weight => number(jewel.weight),
        Field::Width => number(jewel.width),
        Field::Height => number(jewel.height),
        Field::Metal => text(&jewel.metal),
        Field::Probe => text(&jewel.probe),
        Field::ForWhom => text(&jewel.for_whom),
        Field::Gems => text(&jewel.gems),
        Field::Collection => text(&jewel.collection),
        Field::ImageUrls => jewel.image_urls.join(","),
        Field::Images => jewel.images.join(","),
    }
}

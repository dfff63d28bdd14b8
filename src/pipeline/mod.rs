//! Output pipeline: image downloads and the CSV feed
//!
//! Takes the records produced by a scrape run, downloads their images
//! into the site's image store and writes the `items.csv` feed. The
//! spider stays unaware of storage; the extraction core stays unaware
//! of both.

mod error;
pub mod feed;
pub mod images;

pub use error::PipelineError;
pub use images::{fill_images, ImageOutcome};

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::config::ScrapeConfig;
use crate::jewel::Jewel;

/// Run the full output pipeline for one site's records.
///
/// Downloads every record's images (filling the `images` field) and
/// then writes the feed. Returns the feed path.
#[instrument(skip(config, jewels), fields(site = %site, records = jewels.len()))]
pub async fn process_records(
    config: &ScrapeConfig,
    site: &str,
    jewels: &mut [Jewel],
) -> Result<PathBuf, PipelineError> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .build()?;
    let store = config.images_store(site);

    for jewel in jewels.iter_mut() {
        images::process_item(&client, &store, jewel).await?;
    }
    info!("Downloaded images into {}", store.display());

    let feed_path = config.feed_path(site);
    feed::write_feed(&feed_path, jewels)?;
    Ok(feed_path)
}

//! Image download store and record postprocessing
//!
//! Downloads a record's image URLs into the site's image store and
//! folds the outcomes back into the record. The `images` field ends up
//! holding only the local paths of successful downloads, in the same
//! relative order as the source URLs; richer download metadata is
//! deliberately discarded.

use std::path::Path;

use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;

use crate::jewel::Jewel;
use crate::pipeline::error::PipelineError;

/// Downloads within one record run concurrently, but outcomes keep URL order.
const DOWNLOAD_CONCURRENCY: usize = 4;

/// Outcome of one image download, in the order the URLs were listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOutcome {
    /// Whether the download succeeded
    pub ok: bool,
    /// Path of the stored file, relative to the image store
    pub path: String,
}

/// Reduce download outcomes to the record's `images` field: successful
/// paths only, relative order preserved.
pub fn fill_images(jewel: &mut Jewel, outcomes: &[ImageOutcome]) {
    jewel.images = outcomes
        .iter()
        .filter(|outcome| outcome.ok)
        .map(|outcome| outcome.path.clone())
        .collect();
}

/// Download every image of one record into the store and fill its
/// `images` field. Individual download failures become unsuccessful
/// outcomes, not errors; only a broken store directory fails the call.
pub async fn process_item(
    client: &reqwest::Client,
    store: &Path,
    jewel: &mut Jewel,
) -> Result<(), PipelineError> {
    if jewel.image_urls.is_empty() {
        jewel.images.clear();
        return Ok(());
    }
    tokio::fs::create_dir_all(store.join("full")).await?;

    let outcomes: Vec<ImageOutcome> = stream::iter(jewel.image_urls.clone())
        .map(|url| download_one(client, store, url))
        .buffered(DOWNLOAD_CONCURRENCY)
        .collect()
        .await;

    fill_images(jewel, &outcomes);
    Ok(())
}

async fn download_one(client: &reqwest::Client, store: &Path, url: String) -> ImageOutcome {
    let relative = store_path(&url);

    let bytes = match fetch_bytes(client, &url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to download image {}: {}", url, e);
            return ImageOutcome {
                ok: false,
                path: String::new(),
            };
        }
    };

    if let Err(e) = tokio::fs::write(store.join(&relative), &bytes).await {
        warn!("Failed to store image {}: {}", url, e);
        return ImageOutcome {
            ok: false,
            path: String::new(),
        };
    }

    debug!("Stored image {} as {}", url, relative);
    ImageOutcome {
        ok: true,
        path: relative,
    }
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, PipelineError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Store path for one image URL: `full/<sha256 of the url>.<ext>`.
/// Hashing keeps names collision-free and re-download idempotent.
fn store_path(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hash: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("full/{}.{}", hash, extension(url))
}

fn extension(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .map(|ext| ext.to_string_lossy().to_string())
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= 4)
        .unwrap_or_else(|| "jpg".to_string())
}

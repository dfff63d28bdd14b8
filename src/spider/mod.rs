//! Site spiders: page discovery, fetching and per-page extraction
//!
//! A `SiteSpider` ties together everything needed to scrape one site:
//! where its sitemaps live, how to recognize its product pages and
//! which parser turns a fetched page into a `Jewel`. The scrape loop
//! fetches product pages concurrently and extracts each one in
//! isolation, so a single broken page is logged and counted without
//! touching the rest of the batch.

mod error;
pub mod sitemap;

pub use error::SpiderError;

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::config::ScrapeConfig;
use crate::jewel::Jewel;
use crate::parser::sokolov_ru::SokolovRuParser;
use crate::parser::{parse_jewel, MissingFieldPolicy, ParseError};

/// Everything needed to scrape one site.
#[derive(Debug, Clone)]
pub struct SiteSpider {
    /// Domain the spider is registered for
    pub domain: String,
    /// Sitemap roots to start discovery from
    pub sitemap_urls: Vec<String>,
    /// Path prefix shared by all product pages
    pub product_prefix: String,
    /// Parser turning one fetched page into a record
    pub parse: fn(&str, MissingFieldPolicy) -> Result<Jewel, ParseError>,
}

/// The sokolov.ru spider.
pub fn sokolov_ru_spider() -> SiteSpider {
    SiteSpider {
        domain: "sokolov.ru".to_string(),
        sitemap_urls: vec!["https://sokolov.ru/sitemap.xml".to_string()],
        product_prefix: "/jewelry-catalog/product/".to_string(),
        parse: parse_sokolov_page,
    }
}

/// Look up the spider registered for a domain.
pub fn site_spider(domain: &str) -> Result<SiteSpider, SpiderError> {
    match domain {
        "sokolov.ru" => Ok(sokolov_ru_spider()),
        _ => Err(SpiderError::UnknownSite(domain.to_string())),
    }
}

fn parse_sokolov_page(html: &str, policy: MissingFieldPolicy) -> Result<Jewel, ParseError> {
    let document = Html::parse_document(html);
    let parser = SokolovRuParser::new(&document)?;
    parse_jewel(&parser, policy)
}

/// One successfully extracted product page.
#[derive(Debug, Clone)]
pub struct ScrapedJewel {
    /// Product page URL
    pub url: String,
    /// The extracted record
    pub jewel: Jewel,
}

/// Counters for one scrape run.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// Discover, fetch and extract every product page of a site.
///
/// Pages are fetched concurrently under a semaphore; each page is
/// parsed synchronously on its worker with nothing shared between
/// extractions. Failed pages are logged with their URL and counted.
#[instrument(skip(site, config), fields(site = %site.domain))]
pub async fn scrape_site(
    site: &SiteSpider,
    config: &ScrapeConfig,
) -> Result<(Vec<ScrapedJewel>, ScrapeStats), SpiderError> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .build()?;

    let mut urls = sitemap::discover_product_urls(&client, site).await?;
    if let Some(limit) = config.page_limit {
        urls.truncate(limit);
    }
    let total = urls.len();
    info!("Scraping {} product pages", total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let client = Arc::new(client);
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(String, Result<Jewel, String>)>(
        config.concurrency * 2,
    );

    for url in urls {
        let client = Arc::clone(&client);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let config = config.clone();
        let parse = site.parse;
        let policy = config.missing_field_policy;

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let outcome = match fetch_with_retry(&client, &url, &config).await {
                // The document is parsed and dropped here, before the
                // result crosses back to the collector.
                Ok(body) => parse(&body, policy).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send((url, outcome)).await;
        });
    }
    // Close the channel once all workers are done
    drop(tx);

    let mut jewels = Vec::new();
    let mut errors = 0usize;
    while let Some((url, outcome)) = rx.recv().await {
        match outcome {
            Ok(jewel) => jewels.push(ScrapedJewel { url, jewel }),
            Err(e) => {
                warn!("Failed to scrape {}: {}", url, e);
                errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let stats = ScrapeStats {
        total,
        ok: jewels.len(),
        errors,
    };
    info!(
        "Scraped {} pages ({} ok, {} errors)",
        stats.total, stats.ok, stats.errors
    );
    Ok((jewels, stats))
}

async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    config: &ScrapeConfig,
) -> Result<String, SpiderError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(body) => return Ok(body),
            Err(err) if attempt < config.max_retries && is_transient(&err) => {
                let backoff = config.backoff(attempt);
                warn!(
                    "Transient failure on {} (attempt {}/{}), backing off {:.1}s: {}",
                    url,
                    attempt + 1,
                    config.max_retries,
                    backoff.as_secs_f64(),
                    err
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<String, SpiderError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

fn is_transient(err: &SpiderError) -> bool {
    match err {
        SpiderError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|status| status.as_u16() == 429 || status.is_server_error())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spider(server_url: &str) -> SiteSpider {
        let mut spider = sokolov_ru_spider();
        spider.sitemap_urls = vec![format!("{server_url}/sitemap.xml")];
        spider
    }

    fn fast_config() -> ScrapeConfig {
        ScrapeConfig::builder().max_retries(0).build()
    }

    const PRODUCT_PAGE: &str = r#"<html><body>
      <div class="product" data-list-id="product"
           data-detail-category="Украшения/Серьги">
        <h1 data-detail-name="Серьги из серебра"></h1>
        <meta itemprop="sku" content="94021449">
        <meta itemprop="price" content="1490">
        <meta itemprop="priceCurrency" content="RUB">
      </div>
    </body></html>"#;

    #[tokio::test]
    async fn scrapes_discovered_product_pages() {
        let mut server = mockito::Server::new_async().await;

        let sitemap = format!(
            r#"<urlset>
                 <url><loc>{0}/jewelry-catalog/product/94021449/</loc></url>
               </urlset>"#,
            server.url()
        );
        let _sitemap = server
            .mock("GET", "/sitemap.xml")
            .with_body(sitemap)
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/jewelry-catalog/product/94021449/")
            .with_body(PRODUCT_PAGE)
            .create_async()
            .await;

        let spider = test_spider(&server.url());
        let (jewels, stats) = scrape_site(&spider, &fast_config()).await.unwrap();

        assert_eq!(stats.total, 1);
        assert_eq!(stats.ok, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(jewels[0].jewel.title.as_deref(), Some("Серьги из серебра"));
        assert_eq!(jewels[0].jewel.category.as_deref(), Some("Серьги"));
        assert_eq!(jewels[0].jewel.price, Some(1490.0));
    }

    #[tokio::test]
    async fn one_broken_page_does_not_abort_the_batch() {
        let mut server = mockito::Server::new_async().await;

        let sitemap = format!(
            r#"<urlset>
                 <url><loc>{0}/jewelry-catalog/product/ok/</loc></url>
                 <url><loc>{0}/jewelry-catalog/product/broken/</loc></url>
               </urlset>"#,
            server.url()
        );
        let _sitemap = server
            .mock("GET", "/sitemap.xml")
            .with_body(sitemap)
            .create_async()
            .await;
        let _ok = server
            .mock("GET", "/jewelry-catalog/product/ok/")
            .with_body(PRODUCT_PAGE)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/jewelry-catalog/product/broken/")
            .with_status(404)
            .create_async()
            .await;

        let spider = test_spider(&server.url());
        let (jewels, stats) = scrape_site(&spider, &fast_config()).await.unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.ok, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(jewels.len(), 1);
    }

    #[test]
    fn unknown_site_is_an_error() {
        assert!(matches!(
            site_spider("example.com"),
            Err(SpiderError::UnknownSite(_))
        ));
    }
}

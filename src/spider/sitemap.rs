//! Sitemap-driven product page discovery
//!
//! Sites publish their catalog through sitemap XML: a root sitemap
//! index pointing at nested `.xml` sitemaps whose entries are page
//! URLs. Discovery walks that tree breadth-first, following nested
//! sitemaps and keeping only the entries that look like product pages
//! for the site being scraped.

use std::collections::HashSet;

use tracing::{debug, info};
use url::Url;

use crate::spider::error::SpiderError;
use crate::spider::SiteSpider;

/// Whether a sitemap entry points at another sitemap to follow.
pub fn is_sitemap_url(url: &str) -> bool {
    url.ends_with(".xml")
}

/// Whether a URL is a product page, judged by its path prefix.
pub fn is_product_url(url: &str, product_prefix: &str) -> bool {
    match Url::parse(url) {
        Ok(url) => url.path().starts_with(product_prefix),
        Err(_) => false,
    }
}

/// Extract every `<loc>` URL from a urlset or sitemapindex document.
pub fn parse_locs(xml: &str) -> Result<Vec<String>, SpiderError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut in_entry = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"url" | b"sitemap" => in_entry = true,
                b"loc" if in_entry => in_loc = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                let loc = e
                    .unescape()
                    .map_err(|err| SpiderError::Xml(err.to_string()))?;
                locs.push(loc.trim().to_string());
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"loc" => in_loc = false,
                b"url" | b"sitemap" => in_entry = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(locs)
}

/// Walk the site's sitemaps and return its product page URLs.
///
/// Nested sitemaps are followed; entries that are neither sitemaps nor
/// product pages are dropped, mirroring the site's sitemap filter.
pub async fn discover_product_urls(
    client: &reqwest::Client,
    site: &SiteSpider,
) -> Result<Vec<String>, SpiderError> {
    let mut queue: Vec<String> = site.sitemap_urls.clone();
    let mut seen: HashSet<String> = queue.iter().cloned().collect();
    let mut products = Vec::new();

    while let Some(sitemap_url) = queue.pop() {
        info!("Fetching sitemap: {}", sitemap_url);
        let xml = client
            .get(&sitemap_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        for loc in parse_locs(&xml)? {
            if is_sitemap_url(&loc) {
                if seen.insert(loc.clone()) {
                    queue.push(loc);
                }
            } else if is_product_url(&loc, &site.product_prefix) {
                products.push(loc);
            } else {
                debug!("Skipping non-product URL: {}", loc);
            }
        }
    }

    info!(
        "Discovered {} product pages for {}",
        products.len(),
        site.domain
    );
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spider::sokolov_ru_spider;

    #[test]
    fn parses_urlset_locs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://sokolov.ru/jewelry-catalog/product/94012415/</loc></url>
              <url><loc>https://sokolov.ru/about/</loc></url>
            </urlset>"#;
        let locs = parse_locs(xml).unwrap();
        assert_eq!(
            locs,
            vec![
                "https://sokolov.ru/jewelry-catalog/product/94012415/",
                "https://sokolov.ru/about/"
            ]
        );
    }

    #[test]
    fn parses_sitemapindex_locs() {
        let xml = r#"<sitemapindex>
              <sitemap><loc>https://sokolov.ru/sitemap-products-1.xml</loc></sitemap>
            </sitemapindex>"#;
        let locs = parse_locs(xml).unwrap();
        assert_eq!(locs, vec!["https://sokolov.ru/sitemap-products-1.xml"]);
    }

    #[test]
    fn product_urls_are_judged_by_path_prefix() {
        let spider = sokolov_ru_spider();
        assert!(is_product_url(
            "https://sokolov.ru/jewelry-catalog/product/94012415/",
            &spider.product_prefix
        ));
        assert!(!is_product_url(
            "https://sokolov.ru/about/",
            &spider.product_prefix
        ));
        assert!(!is_product_url("not a url", &spider.product_prefix));
    }

    #[tokio::test]
    async fn discovery_follows_nested_sitemaps() {
        let mut server = mockito::Server::new_async().await;

        let nested = format!(
            r#"<urlset>
                 <url><loc>{0}/jewelry-catalog/product/1/</loc></url>
                 <url><loc>{0}/jewelry-catalog/product/2/</loc></url>
                 <url><loc>{0}/news/</loc></url>
               </urlset>"#,
            server.url()
        );
        let index = format!(
            r#"<sitemapindex>
                 <sitemap><loc>{0}/sitemap-products.xml</loc></sitemap>
               </sitemapindex>"#,
            server.url()
        );

        let _root = server
            .mock("GET", "/sitemap.xml")
            .with_body(index)
            .create_async()
            .await;
        let _nested = server
            .mock("GET", "/sitemap-products.xml")
            .with_body(nested)
            .create_async()
            .await;

        let mut spider = sokolov_ru_spider();
        spider.sitemap_urls = vec![format!("{}/sitemap.xml", server.url())];

        let client = reqwest::Client::new();
        let urls = discover_product_urls(&client, &spider).await.unwrap();
        assert_eq!(
            urls,
            vec![
                format!("{}/jewelry-catalog/product/1/", server.url()),
                format!("{}/jewelry-catalog/product/2/", server.url()),
            ]
        );
    }
}

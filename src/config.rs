//! Scrape run configuration
//!
//! Controls for the fetch layer (politeness, retries, concurrency) and
//! the on-disk output layout. Each scraped site gets its own directory
//! under the output root, named after the domain with dots replaced by
//! underscores, holding the `items.csv` feed and an `images/` store.

use std::path::PathBuf;
use std::time::Duration;

use crate::parser::MissingFieldPolicy;

/// Configuration for one scrape run
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Root directory for scraped output
    pub output_root: PathBuf,

    /// User agent sent with every request
    pub user_agent: String,

    /// Number of pages fetched concurrently
    pub concurrency: usize,

    /// Retry attempts for transient HTTP failures
    pub max_retries: u32,

    /// Base backoff between retries, doubled per attempt
    pub base_backoff_ms: u64,

    /// Cap on the number of product pages to process
    pub page_limit: Option<usize>,

    /// Whether adapters must cover every mandatory field
    pub missing_field_policy: MissingFieldPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("data/raw"),
            user_agent: format!("karat-spider/{}", env!("CARGO_PKG_VERSION")),
            concurrency: 10,
            max_retries: 3,
            base_backoff_ms: 2000,
            page_limit: None,
            missing_field_policy: MissingFieldPolicy::Allow,
        }
    }
}

impl ScrapeConfig {
    /// Create a new builder
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::new()
    }

    /// Directory holding all output for one site
    pub fn site_dir(&self, site: &str) -> PathBuf {
        self.output_root.join(site.replace('.', "_"))
    }

    /// Path of the CSV feed for one site
    pub fn feed_path(&self, site: &str) -> PathBuf {
        self.site_dir(site).join("items.csv")
    }

    /// Directory images for one site are downloaded into
    pub fn images_store(&self, site: &str) -> PathBuf {
        self.site_dir(site).join("images")
    }

    /// Backoff before retry `attempt` (zero-based), doubling each time
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_backoff_ms * 2u64.pow(attempt))
    }
}

/// Builder for ScrapeConfig
#[derive(Debug, Default)]
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScrapeConfig::default(),
        }
    }

    /// Set the root directory for scraped output
    pub fn output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.config.output_root = output_root.into();
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the fetch concurrency
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the retry attempt count
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the page limit
    pub fn page_limit(mut self, page_limit: Option<usize>) -> Self {
        self.config.page_limit = page_limit;
        self
    }

    /// Set the mandatory-field policy
    pub fn missing_field_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.config.missing_field_policy = policy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ScrapeConfig {
        self.config
    }
}

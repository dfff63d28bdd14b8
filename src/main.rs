//! # karat CLI Application
//!
//! Command-line interface for scraping jewelry catalogs: discovers a
//! site's product pages through its sitemaps, extracts each page into
//! a normalized record and writes the CSV feed plus downloaded images
//! under the output root. A second subcommand extracts one saved page
//! for adapter debugging.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use karat::config::ScrapeConfig;
use karat::jewel::Jewel;
use karat::parser::MissingFieldPolicy;
use karat::pipeline::process_records;
use karat::spider::{scrape_site, site_spider};

#[derive(Parser)]
#[command(author, version, about = "Scrape and normalize jewelry product catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape a site's catalog into a CSV feed and image store
    Scrape(ScrapeArgs),

    /// Extract one saved product page and print the record as JSON
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// The domain name of the website to scrape data from
    #[arg(short, long)]
    site: String,

    /// Root directory for scraped output
    #[arg(short, long, default_value = "data/raw")]
    output: PathBuf,

    /// Max product pages to scrape (default: all discovered)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Number of pages fetched concurrently
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Fail pages whose adapter misses a mandatory field handler
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// The domain whose adapter to use
    #[arg(short, long, default_value = "sokolov.ru")]
    site: String,

    /// Path to a saved product page
    file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape(args) => scrape(args).await,
        Commands::Extract(args) => extract(args).await,
    }
}

async fn scrape(args: ScrapeArgs) -> anyhow::Result<()> {
    let spider = site_spider(&args.site)?;
    let policy = if args.strict {
        MissingFieldPolicy::Deny
    } else {
        MissingFieldPolicy::Allow
    };
    let config = ScrapeConfig::builder()
        .output_root(args.output)
        .concurrency(args.concurrency)
        .page_limit(args.limit)
        .missing_field_policy(policy)
        .build();

    let (scraped, stats) = scrape_site(&spider, &config).await?;
    println!(
        "Scraped {} pages ({} ok, {} errors)",
        stats.total, stats.ok, stats.errors
    );

    let mut jewels: Vec<Jewel> = scraped.into_iter().map(|page| page.jewel).collect();
    let feed = process_records(&config, &args.site, &mut jewels).await?;
    println!("Feed written to {}", feed.display());
    Ok(())
}

async fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let spider = site_spider(&args.site)?;
    let html = tokio::fs::read_to_string(&args.file).await?;
    let jewel = (spider.parse)(&html, MissingFieldPolicy::Allow)?;
    println!("{}", serde_json::to_string_pretty(&jewel)?);
    Ok(())
}

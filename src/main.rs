//! Review-Harvest main entry point
//!
//! This is the command-line interface for the review ingestion pipeline.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser};
use review_harvest::cache::ReviewCache;
use review_harvest::config::{load_config_with_hash, Config};
use review_harvest::review::{parse_review_date, reviews_since, Review, Source};
use review_harvest::sentiment::SentimentStats;
use review_harvest::ReviewFetcher;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Review-Harvest: fetch, moderate, and merge third-party reviews
///
/// Reviews are fetched from the Google and Facebook scraper providers, served
/// from the cache when fresh, and printed as one JSON feed, newest first.
#[derive(Parser, Debug)]
#[command(name = "review-harvest")]
#[command(version)]
#[command(about = "Fetch, moderate, and merge third-party reviews", long_about = None)]
#[command(group(
    ArgGroup::new("sources")
        .required(true)
        .multiple(true)
        .args(["place_id", "page_url"])
))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Google Place ID to fetch reviews for
    #[arg(long)]
    place_id: Option<String>,

    /// Facebook page URL to fetch reviews for
    #[arg(long)]
    page_url: Option<String>,

    /// Drop cached entries before fetching
    #[arg(long)]
    refresh: bool,

    /// Only output reviews dated after this timestamp (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_since)]
    since: Option<DateTime<Utc>>,

    /// Include aggregate sentiment statistics in the output
    #[arg(long)]
    sentiment: bool,

    /// Poll every SECS seconds and print only reviews that are new since the last poll
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    parse_review_date(value).ok_or_else(|| format!("unrecognized timestamp '{}'", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let fetcher = build_fetcher(&config)?;

    if let Err(e) = fetcher.cache().purge_expired().await {
        tracing::warn!("Failed to purge expired cache entries: {}", e);
    }

    if cli.refresh {
        invalidate_sources(&fetcher, &cli).await?;
    }

    match cli.watch {
        Some(seconds) => handle_watch(&fetcher, &cli, seconds).await,
        None => handle_fetch(&fetcher, &cli).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that stdout carries only JSON.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_harvest=info,warn"),
            1 => EnvFilter::new("review_harvest=debug,info"),
            2 => EnvFilter::new("review_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the cache and the fetcher that owns it for the life of the process
fn build_fetcher(config: &Config) -> anyhow::Result<Arc<ReviewFetcher>> {
    let cache = ReviewCache::from_config(&config.cache).context("failed to open review cache")?;
    let fetcher = ReviewFetcher::new(config, cache).context("failed to set up review fetcher")?;
    Ok(Arc::new(fetcher))
}

async fn invalidate_sources(fetcher: &ReviewFetcher, cli: &Cli) -> anyhow::Result<()> {
    let targets = [
        (Source::Google, cli.place_id.as_deref()),
        (Source::Facebook, cli.page_url.as_deref()),
    ];

    for (source, identifier) in targets {
        if let Some(identifier) = identifier.filter(|id| !id.is_empty()) {
            fetcher
                .cache()
                .invalidate(source, identifier)
                .await
                .with_context(|| format!("failed to invalidate {} cache entry", source))?;
        }
    }

    Ok(())
}

/// Handles a single combined fetch
async fn handle_fetch(fetcher: &Arc<ReviewFetcher>, cli: &Cli) -> anyhow::Result<()> {
    let reviews = fetcher
        .fetch_all_reviews(cli.place_id.as_deref(), cli.page_url.as_deref())
        .await
        .context("failed to fetch reviews")?;

    let reviews = match cli.since {
        Some(since) => reviews_since(&reviews, since),
        None => reviews,
    };

    tracing::info!("Fetched {} reviews", reviews.len());
    print_reviews(&reviews, cli.sentiment)
}

/// Handles --watch: polls on an interval and prints only new reviews
///
/// A failed poll is logged and leaves the last-checked time untouched, so the
/// reviews it would have reported are picked up by the next successful poll.
async fn handle_watch(
    fetcher: &Arc<ReviewFetcher>,
    cli: &Cli,
    seconds: u64,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(seconds.max(1)));
    let mut last_check = cli.since;

    tracing::info!("Watching for new reviews every {}s (Ctrl-C to stop)", seconds.max(1));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                return Ok(());
            }
        }

        let polled_at = Utc::now();
        let reviews = match fetcher
            .fetch_all_reviews(cli.place_id.as_deref(), cli.page_url.as_deref())
            .await
        {
            Ok(reviews) => reviews,
            Err(e) => {
                tracing::error!("Poll failed, will retry next interval: {}", e);
                continue;
            }
        };

        let fresh = match last_check {
            Some(since) => reviews_since(&reviews, since),
            None => reviews,
        };
        last_check = Some(polled_at);

        if fresh.is_empty() {
            tracing::debug!("No new reviews");
            continue;
        }

        tracing::info!("{} new reviews", fresh.len());
        print_reviews(&fresh, cli.sentiment)?;
    }
}

fn print_reviews(reviews: &[Review], with_sentiment: bool) -> anyhow::Result<()> {
    let output = if with_sentiment {
        serde_json::to_string_pretty(&serde_json::json!({
            "reviews": reviews,
            "sentiment": SentimentStats::from_reviews(reviews),
        }))?
    } else {
        serde_json::to_string_pretty(reviews)?
    };

    println!("{}", output);
    Ok(())
}

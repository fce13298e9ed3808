//! Review-Harvest: a review ingestion pipeline
//!
//! This crate fetches third-party customer reviews from paid scraper providers,
//! caches moderated results, and merges the sources into a single date-ordered feed.

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod moderation;
pub mod review;
pub mod sentiment;

use review::Source;
use thiserror::Error;

/// Main error type for Review-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid {provider} identifier: {message}")]
    Validation { provider: Source, message: String },

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Fetch task failed: {0}")]
    Task(String),

    #[error("Fetch did not complete within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from a single provider call
///
/// Every variant is considered transient and is retried; after the final attempt
/// the last error is returned as-is so callers can tell a status failure from a
/// timeout or a connection problem.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} provider returned HTTP {status}")]
    Status { provider: Source, status: u16 },

    #[error("{provider} provider request timed out")]
    Timeout { provider: Source },

    #[error("{provider} provider request failed: {message}")]
    Network { provider: Source, message: String },

    #[error("{provider} provider returned an undecodable body: {message}")]
    Decode { provider: Source, message: String },
}

impl ProviderError {
    /// The source whose call produced this error
    pub fn provider(&self) -> Source {
        match self {
            Self::Status { provider, .. }
            | Self::Timeout { provider }
            | Self::Network { provider, .. }
            | Self::Decode { provider, .. } => *provider,
        }
    }
}

/// Result type alias for Review-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::ReviewFetcher;
pub use moderation::ModerationFilter;
pub use review::{merge_reviews, Review};

use serde::Deserialize;

/// Main configuration structure for Review-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Caller-level bound on a whole combined fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default)]
    pub fetch_timeout_secs: Option<u64>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub google: SourceConfig,

    #[serde(default)]
    pub facebook: SourceConfig,

    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub moderation: ModerationConfig,
}

/// Scraper provider endpoint configuration, shared by both sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProviderConfig {
    /// Base URL of the scraper API
    pub api_base: String,

    /// Maximum number of reviews requested per run
    pub max_reviews: u32,

    /// Review language requested from the scraper
    pub language: String,

    /// HTTP timeout for a single scraper run (seconds)
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.apify.com".to_string(),
            max_reviews: 100,
            language: "en".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Credentials for one review source
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Scraper actor that produces this source's reviews
    pub actor_id: String,

    /// Bearer token; read from the environment when absent
    pub api_token: Option<String>,
}

/// Sliding-window limits, applied to each source independently
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateLimitConfig {
    /// Maximum acquisitions within one window
    pub max_requests: u32,

    /// Window length (milliseconds)
    pub interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            interval_ms: 60_000,
        }
    }
}

/// Exponential backoff settings for provider calls
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_retries: u32,

    /// Delay after the first failure (milliseconds)
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay (milliseconds)
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after every failure
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
        }
    }
}

/// Which store backs the review cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Review cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Database file for the sqlite backend
    pub path: Option<String>,

    /// Lifetime of a cache entry (seconds)
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            path: None,
            ttl_seconds: 3_600,
        }
    }
}

/// Moderation filter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ModerationConfig {
    /// Lower-case words that cause a review to be discarded
    pub blocked_words: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            blocked_words: vec!["inappropriate".to_string(), "offensive".to_string()],
        }
    }
}

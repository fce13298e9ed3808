//! Review fetch orchestration
//!
//! Each per-source fetch runs strictly in order:
//! 1. Validate the identifier (no network call for an empty one)
//! 2. Check the cache and return on a hit
//! 3. Wait for a rate limiter slot
//! 4. Call the provider, retrying with backoff
//! 5. Normalize and moderate the payload
//! 6. Write the moderated list back to the cache
//!
//! A combined fetch runs the two sources as separate tasks and fails as soon as
//! either configured source fails. A source with no identifier contributes
//! nothing rather than failing the request.

use crate::cache::ReviewCache;
use crate::config::{resolve_credentials, Config, Credentials};
use crate::fetcher::client::ProviderClient;
use crate::fetcher::rate_limit::RateLimiter;
use crate::fetcher::retry::RetryManager;
use crate::moderation::ModerationFilter;
use crate::review::{merge_reviews, normalize_payload, Review, Source};
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Credentials and rate limiter for one source
#[derive(Debug)]
struct SourceChannel {
    credentials: Credentials,
    limiter: RateLimiter,
}

/// Main review fetch coordinator
///
/// The cache is injected by the caller, which owns its lifetime; the rate
/// limiters live as long as the fetcher and are shared by every clone of the
/// `Arc` it is held in.
pub struct ReviewFetcher {
    client: ProviderClient,
    google: SourceChannel,
    facebook: SourceChannel,
    cache: ReviewCache,
    retry: RetryManager,
    moderation: ModerationFilter,
    fetch_timeout: Option<Duration>,
}

impl ReviewFetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `cache` - The review cache to read from and write back to
    ///
    /// # Returns
    ///
    /// * `Ok(ReviewFetcher)` - Ready to fetch
    /// * `Err(HarvestError::Config)` - Missing credentials, invalid limits, or
    ///   an HTTP client that cannot be built
    pub fn new(config: &Config, cache: ReviewCache) -> Result<Self, HarvestError> {
        let google = SourceChannel {
            credentials: resolve_credentials(
                Source::Google.as_str(),
                &config.google,
                Source::Google.token_env(),
            )?,
            limiter: RateLimiter::new(config.rate_limit)?,
        };

        let facebook = SourceChannel {
            credentials: resolve_credentials(
                Source::Facebook.as_str(),
                &config.facebook,
                Source::Facebook.token_env(),
            )?,
            limiter: RateLimiter::new(config.rate_limit)?,
        };

        Ok(Self {
            client: ProviderClient::new(&config.provider)?,
            google,
            facebook,
            cache,
            retry: RetryManager::from_config(&config.retry)?,
            moderation: ModerationFilter::from_config(&config.moderation),
            fetch_timeout: config.fetch_timeout_secs.map(Duration::from_secs),
        })
    }

    /// The cache this fetcher reads and writes
    pub fn cache(&self) -> &ReviewCache {
        &self.cache
    }

    fn channel(&self, source: Source) -> &SourceChannel {
        match source {
            Source::Google => &self.google,
            Source::Facebook => &self.facebook,
        }
    }

    /// Fetches moderated Google reviews for a Place ID
    pub async fn fetch_google_reviews(&self, place_id: &str) -> Result<Vec<Review>, HarvestError> {
        self.fetch_source(Source::Google, place_id).await
    }

    /// Fetches moderated Facebook reviews for a page URL
    pub async fn fetch_facebook_reviews(&self, page_url: &str) -> Result<Vec<Review>, HarvestError> {
        self.fetch_source(Source::Facebook, page_url).await
    }

    /// Fetches one source, serving from the cache when possible
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Review>)` - Moderated reviews, possibly empty
    /// * `Err(HarvestError::Validation)` - The identifier is empty
    /// * `Err(HarvestError::Provider)` - The provider failed on every attempt;
    ///   the error is the one from the final attempt
    pub async fn fetch_source(
        &self,
        source: Source,
        identifier: &str,
    ) -> Result<Vec<Review>, HarvestError> {
        if identifier.is_empty() {
            return Err(HarvestError::Validation {
                provider: source,
                message: "identifier is required".to_string(),
            });
        }

        if let Some(cached) = self.cache.get(source, identifier).await {
            tracing::debug!("Serving {} cached {} reviews", cached.len(), source);
            return Ok(cached);
        }

        let channel = self.channel(source);
        channel.limiter.acquire().await;

        let payload = self
            .retry
            .execute(|| self.client.run(source, &channel.credentials, identifier))
            .await?;

        let normalized = normalize_payload(source, &payload, Utc::now());
        let fetched = normalized.len();
        let reviews = self.moderation.filter_reviews(normalized);

        tracing::info!(
            "Fetched {} {} reviews for {} ({} kept after moderation)",
            fetched,
            source,
            identifier,
            reviews.len()
        );

        self.cache.set(source, identifier, &reviews).await;

        Ok(reviews)
    }

    /// Drops the cached entry for a source, then fetches it live
    pub async fn refresh_source(
        &self,
        source: Source,
        identifier: &str,
    ) -> Result<Vec<Review>, HarvestError> {
        if identifier.is_empty() {
            return Err(HarvestError::Validation {
                provider: source,
                message: "identifier is required".to_string(),
            });
        }

        self.cache.invalidate(source, identifier).await?;
        self.fetch_source(source, identifier).await
    }

    /// Fetches both sources concurrently and merges them newest first
    ///
    /// A `None` or empty identifier means the source is not configured and
    /// contributes an empty list. If any configured source fails, the whole
    /// call fails; there is no partial result. When a fetch timeout is
    /// configured, exceeding it yields `HarvestError::Timeout`.
    pub async fn fetch_all_reviews(
        self: &Arc<Self>,
        place_id: Option<&str>,
        page_url: Option<&str>,
    ) -> Result<Vec<Review>, HarvestError> {
        let combined = self.fetch_both(place_id, page_url);

        let result = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, combined)
                .await
                .unwrap_or_else(|_| {
                    Err(HarvestError::Timeout {
                        seconds: limit.as_secs(),
                    })
                }),
            None => combined.await,
        };

        match &result {
            Err(HarvestError::Provider(e)) => {
                tracing::error!(provider = %e.provider(), "Error fetching all reviews: {}", e);
            }
            Err(e) => tracing::error!("Error fetching all reviews: {}", e),
            Ok(_) => {}
        }

        result
    }

    async fn fetch_both(
        self: &Arc<Self>,
        place_id: Option<&str>,
        page_url: Option<&str>,
    ) -> Result<Vec<Review>, HarvestError> {
        let google = self.spawn_fetch(Source::Google, place_id);
        let facebook = self.spawn_fetch(Source::Facebook, page_url);

        let (google, facebook) = tokio::try_join!(
            join_fetch(Source::Google, google),
            join_fetch(Source::Facebook, facebook)
        )?;

        Ok(merge_reviews([google, facebook]))
    }

    /// Spawns a fetch task, or returns `None` when the source is not configured
    fn spawn_fetch(
        self: &Arc<Self>,
        source: Source,
        identifier: Option<&str>,
    ) -> Option<JoinHandle<Result<Vec<Review>, HarvestError>>> {
        let identifier = identifier.filter(|id| !id.is_empty())?.to_string();
        let fetcher = Arc::clone(self);

        Some(tokio::spawn(async move {
            fetcher.fetch_source(source, &identifier).await
        }))
    }
}

/// Waits for a spawned fetch; a missing task contributes no reviews
async fn join_fetch(
    source: Source,
    handle: Option<JoinHandle<Result<Vec<Review>, HarvestError>>>,
) -> Result<Vec<Review>, HarvestError> {
    match handle {
        Some(handle) => handle
            .await
            .map_err(|e| HarvestError::Task(format!("{} fetch: {}", source, e)))?,
        None => Ok(Vec::new()),
    }
}

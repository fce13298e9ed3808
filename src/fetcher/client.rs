//! Scraper provider HTTP client
//!
//! Both sources are served by the same scraper platform: a synchronous actor
//! run is started with a POST and the response body is the run's dataset.
//! This module builds those requests and classifies failures; it does not
//! interpret the dataset.

use crate::config::{Credentials, ProviderConfig};
use crate::review::Source;
use crate::{ConfigError, ProviderError};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct StartUrl<'a> {
    url: &'a str,
}

/// JSON input for one scraper run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunInput<'a> {
    start_urls: [StartUrl<'a>; 1],
    max_reviews: u32,
    language: &'a str,
}

/// Builds an HTTP client for provider calls
///
/// Scraper runs are slow, so the request timeout comes from configuration
/// rather than a short fixed value.
pub fn build_http_client(config: &ProviderConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the scraper provider's synchronous run endpoint
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: Client,
    api_base: String,
    max_reviews: u32,
    language: String,
}

impl ProviderClient {
    /// Builds the client
    ///
    /// A client that cannot be built is a configuration failure, reported
    /// alongside missing credentials when the fetcher is constructed.
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: build_http_client(config).map_err(ConfigError::HttpClient)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_reviews: config.max_reviews,
            language: config.language.clone(),
        })
    }

    /// Run endpoint for an actor
    pub fn endpoint(&self, actor_id: &str) -> String {
        format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.api_base, actor_id
        )
    }

    /// Page the scraper starts from for a source identifier
    ///
    /// Google identifiers are Place IDs; Facebook identifiers are page URLs and
    /// are passed through unchanged.
    pub fn start_url(source: Source, identifier: &str) -> String {
        match source {
            Source::Google => format!(
                "https://www.google.com/maps/place/?q=place_id:{}",
                identifier
            ),
            Source::Facebook => identifier.to_string(),
        }
    }

    /// Starts a scraper run and returns its raw dataset
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The decoded JSON body, of any shape
    /// * `Err(ProviderError::Status)` - Non-2xx response
    /// * `Err(ProviderError::Timeout)` - The request timed out
    /// * `Err(ProviderError::Network)` - Connection or transfer failure
    /// * `Err(ProviderError::Decode)` - The body was not JSON
    pub async fn run(
        &self,
        source: Source,
        credentials: &Credentials,
        identifier: &str,
    ) -> Result<Value, ProviderError> {
        let start_url = Self::start_url(source, identifier);
        let input = RunInput {
            start_urls: [StartUrl { url: &start_url }],
            max_reviews: self.max_reviews,
            language: &self.language,
        };

        tracing::info!("Starting {} scraper run for {}", source, identifier);

        let response = self
            .http
            .post(self.endpoint(&credentials.actor_id))
            .bearer_auth(&credentials.api_token)
            .json(&input)
            .send()
            .await
            .map_err(|e| classify(source, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: source,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify(source, e))?;

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            provider: source,
            message: e.to_string(),
        })
    }
}

fn classify(source: Source, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout { provider: source }
    } else {
        ProviderError::Network {
            provider: source,
            message: error.to_string(),
        }
    }
}

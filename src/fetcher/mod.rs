//! Fetcher module for provider calls and orchestration
//!
//! This module contains the review ingestion path, including:
//! - HTTP calls to the scraper provider
//! - Per-source sliding-window rate limiting
//! - Exponential backoff retry
//! - Cache-first fetch orchestration and multi-source merging

mod client;
mod coordinator;
mod rate_limit;
mod retry;

pub use client::{build_http_client, ProviderClient};
pub use coordinator::ReviewFetcher;
pub use rate_limit::RateLimiter;
pub use retry::{BackoffState, RetryManager, RetryPolicy};

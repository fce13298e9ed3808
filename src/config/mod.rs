//! Configuration module for Review-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use review_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Reviews per run: {}", config.provider.max_reviews);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheBackend, CacheConfig, Config, ModerationConfig, ProviderConfig, RateLimitConfig,
    RetryConfig, SourceConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_credentials,
    Credentials,
};

pub(crate) use validation::{validate_rate_limit_config, validate_retry_config};

use crate::config::types::{
    CacheBackend, CacheConfig, Config, ProviderConfig, RateLimitConfig, RetryConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Credentials are not checked here; they are resolved when the fetcher is built
/// so that tokens may come from the environment.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_provider_config(&config.provider)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_retry_config(&config.retry)?;
    validate_cache_config(&config.cache)?;

    if config.fetch_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates provider endpoint configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_base: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "api_base must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.max_reviews < 1 {
        return Err(ConfigError::Validation(
            "max_reviews must be >= 1".to_string(),
        ));
    }

    if config.language.is_empty() {
        return Err(ConfigError::Validation(
            "language cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates rate limiter configuration
///
/// A zero request budget would block every acquisition forever.
pub(crate) fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests must be >= 1, got {}",
            config.max_requests
        )));
    }

    Ok(())
}

/// Validates retry configuration
pub(crate) fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if !config.backoff_factor.is_finite() || config.backoff_factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be a finite number >= 1.0, got {}",
            config.backoff_factor
        )));
    }

    if config.initial_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "initial_delay_ms ({}) cannot exceed max_delay_ms ({})",
            config.initial_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_seconds < 1 {
        return Err(ConfigError::Validation(
            "ttl_seconds must be >= 1".to_string(),
        ));
    }

    if config.backend == CacheBackend::Sqlite
        && config.path.as_deref().map_or(true, str::is_empty)
    {
        return Err(ConfigError::Validation(
            "sqlite cache backend requires a non-empty path".to_string(),
        ));
    }

    Ok(())
}

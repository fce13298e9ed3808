use crate::config::types::{Config, SourceConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Actor id and bearer token for one review source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub actor_id: String,
    pub api_token: String,
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use review_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Cache TTL: {}s", config.cache.ttl_seconds);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so that runs can be matched to the configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Resolves the credentials for a source
///
/// The token comes from the config file when present, otherwise from the
/// environment variable `token_env`. A missing actor id or token is fatal.
///
/// # Arguments
///
/// * `name` - Source name used in error messages
/// * `source` - The source section of the configuration
/// * `token_env` - Environment variable consulted when no token is configured
pub fn resolve_credentials(
    name: &str,
    source: &SourceConfig,
    token_env: &str,
) -> Result<Credentials, ConfigError> {
    if source.actor_id.trim().is_empty() {
        return Err(ConfigError::MissingCredential(format!(
            "{} actor_id is required",
            name
        )));
    }

    let api_token = match source.api_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => token.to_string(),
        None => std::env::var(token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ConfigError::MissingCredential(format!(
                    "{} api_token is required (set it in the config or {})",
                    name, token_env
                ))
            })?,
    };

    Ok(Credentials {
        actor_id: source.actor_id.clone(),
        api_token,
    })
}

use crate::config::types::{Config, CrawlerConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Malformed timeout/size/batch values are the only fatal condition in the
/// system; everything downstream of startup degrades instead of crashing.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_seeds(&config.frontier.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_timeout_seconds < 1 || config.fetch_timeout_seconds > 300 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_seconds must be between 1 and 300, got {}",
            config.fetch_timeout_seconds
        )));
    }

    if config.max_fetch_bytes < 1024 {
        return Err(ConfigError::Validation(format!(
            "max_fetch_bytes must be >= 1024, got {}",
            config.max_fetch_bytes
        )));
    }

    if config.batch_size < 1 || config.batch_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 1000, got {}",
            config.batch_size
        )));
    }

    if config.worker_count > 64 {
        return Err(ConfigError::Validation(format!(
            "worker_count must be <= 64 (0 = auto), got {}",
            config.worker_count
        )));
    }

    if config.session_budget_seconds < 10 {
        return Err(ConfigError::Validation(format!(
            "session_budget_seconds must be >= 10, got {}",
            config.session_budget_seconds
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates configured seed URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use an HTTP(S) scheme",
                seed
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' has no host",
                seed
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    Ok(())
}

use crate::config::types::{Config, CrawlerConfig, ReclaimConfig, StoreConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_store_config(&config.store)?;
    validate_crawler_config(&config.crawler)?;
    validate_reclaim_config(&config.reclaim)?;
    Ok(())
}

/// Validates store connection configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.url.is_empty() {
        return Err(ConfigError::Validation(
            "store url cannot be empty".to_string(),
        ));
    }

    if !config.url.starts_with("postgres://") && !config.url.starts_with("postgresql://") {
        return Err(ConfigError::Validation(format!(
            "store url must be a postgres:// connection string, got '{}'",
            config.url
        )));
    }

    if config.max_connections < 1 {
        return Err(ConfigError::Validation(format!(
            "max_connections must be >= 1, got {}",
            config.max_connections
        )));
    }

    Ok(())
}

/// Validates crawler pipeline configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetchers < 1 {
        return Err(ConfigError::Validation(format!(
            "fetchers must be >= 1, got {}",
            config.fetchers
        )));
    }

    if config.per_project_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "per_project_cap must be >= 1, got {}",
            config.per_project_cap
        )));
    }

    if config.poll_interval_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 1, got {}",
            config.poll_interval_ms
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.max_fetch_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_fetch_attempts must be >= 1, got {}",
            config.max_fetch_attempts
        )));
    }

    if config.to_crawl_capacity < 1 || config.discovered_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue capacities must be >= 1, got to-crawl {} and discovered {}",
            config.to_crawl_capacity, config.discovered_capacity
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates stale-claim recovery configuration
fn validate_reclaim_config(config: &ReclaimConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "reclaim timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.scan_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "reclaim scan_interval_secs must be >= 1, got {}",
            config.scan_interval_secs
        )));
    }

    Ok(())
}

use crate::config::types::{
    Config, CrawlerConfig, LedgerConfig, PolicyConfig, PolicyKind, StoreConfig, UserAgentConfig,
};
use crate::storage::MAX_DELETE_BATCH;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_policy_config(&config.policy)?;
    validate_ledger_config(&config.ledger)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(config.seed_url.trim()).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed-url '{}': {}", config.seed_url, e))
    })?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' must use http or https",
            config.seed_url
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1, got 0".to_string(),
        ));
    }

    if config.request_delay_ms < 100 || config.request_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "request-delay-ms must be between 100 and 60000, got {}",
            config.request_delay_ms
        )));
    }

    if config.page_timeout_secs == 0 || config.robots_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page-timeout-secs and robots-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_text_length == 0 {
        return Err(ConfigError::Validation(
            "max-text-length must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the link policy section
fn validate_policy_config(config: &PolicyConfig) -> Result<(), ConfigError> {
    if config.kind != PolicyKind::Site {
        return Ok(());
    }

    if config.home_host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site policy requires a non-empty home-host".to_string(),
        ));
    }

    if config.detail_markers.is_empty() && config.listing_markers.is_empty() {
        return Err(ConfigError::Validation(
            "site policy needs at least one detail or listing marker".to_string(),
        ));
    }

    Ok(())
}

fn validate_ledger_config(config: &LedgerConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "ledger path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates store paths and batch sizes
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.read_page_size == 0 {
        return Err(ConfigError::Validation(
            "read-page-size must be >= 1".to_string(),
        ));
    }

    if config.delete_batch_size == 0 || config.delete_batch_size > MAX_DELETE_BATCH {
        return Err(ConfigError::Validation(format!(
            "delete-batch-size must be between 1 and {}, got {}",
            MAX_DELETE_BATCH, config.delete_batch_size
        )));
    }

    Ok(())
}

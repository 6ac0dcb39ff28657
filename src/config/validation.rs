use crate::config::types::{
    CatalogConfig, Config, CrawlerConfig, FilterSet, SelectorConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_selectors(&config.selectors)?;
    validate_filter_sets(&config.filter_sets)?;
    Ok(())
}

/// Validates catalog endpoints
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.search_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search-path cannot be empty".to_string(),
        ));
    }

    if config.result_rows < 1 {
        return Err(ConfigError::Validation(
            "result-rows must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got request={}s connect={}s",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates that every CSS selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("search-result", &config.search_result),
        ("related-item", &config.related_item),
        ("author", &config.author),
    ] {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid {} selector '{}': {:?}", name, selector, e))
        })?;
    }
    Ok(())
}

/// Validates filter sets
fn validate_filter_sets(filter_sets: &[FilterSet]) -> Result<(), ConfigError> {
    if filter_sets.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[filter-set]] is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for set in filter_sets {
        if set.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter-set name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(set.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate filter-set name '{}'",
                set.name
            )));
        }

        if set.filters.iter().any(|(key, _)| key.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "filter-set '{}' has a filter with an empty key",
                set.name
            )));
        }
    }

    Ok(())
}

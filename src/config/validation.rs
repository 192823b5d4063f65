use crate::config::types::{Config, FetcherConfig, SourceConfig, UserAgentConfig};
use crate::url::UrlTemplate;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the source endpoints, pattern and pagination constants
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    UrlTemplate::listing(&config.listing_url_template)
        .map_err(|e| ConfigError::InvalidUrl(format!("listing-url-template: {}", e)))?;

    UrlTemplate::rating(&config.rating_url_template)
        .map_err(|e| ConfigError::InvalidUrl(format!("rating-url-template: {}", e)))?;

    compile_id_pattern(&config.id_pattern)?;

    if config.page_size == 0 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if let Some(timeout) = config.request_timeout_secs {
        if timeout == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be >= 1 when set".to_string(),
            ));
        }
    }

    if config.retry_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be between 0 and 10, got {}",
            config.retry_attempts
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation("name cannot be empty".to_string()));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Compiles the identifier pattern, requiring at least one capture group
pub fn compile_id_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    let regex = Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' has no capture group for the identifier",
            pattern
        )));
    }

    Ok(regex)
}

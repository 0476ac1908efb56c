use crate::config::types::Config;
use crate::ConfigError;
use regex::RegexBuilder;
use url::Url;

/// Upper bound on retries; anything larger is almost certainly a typo
const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site(config)?;
    validate_pagination(config)?;
    validate_request_settings(config)?;
    validate_pattern(&config.pattern)?;
    validate_output(config)?;
    Ok(())
}

/// Validates scheme, host and section
fn validate_site(config: &Config) -> Result<(), ConfigError> {
    if config.scheme != "http" && config.scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "scheme must be http or https, got '{}'",
            config.scheme
        )));
    }

    if config.host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.host.contains('/') || config.host.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "host must be a bare host name, got '{}'",
            config.host
        )));
    }

    let base = Url::parse(&format!("{}://{}/", config.scheme, config.host))
        .map_err(|e| ConfigError::Validation(format!("Invalid host '{}': {}", config.host, e)))?;
    if base.host_str().is_none() {
        return Err(ConfigError::Validation(format!(
            "Invalid host '{}'",
            config.host
        )));
    }

    if config.section.is_empty() {
        return Err(ConfigError::Validation(
            "section cannot be empty".to_string(),
        ));
    }

    if !config
        .section
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "section must contain only alphanumeric characters, '-' or '_', got '{}'",
            config.section
        )));
    }

    Ok(())
}

/// Validates page count, offsets and sort key
fn validate_pagination(config: &Config) -> Result<(), ConfigError> {
    if config.pages < 1 {
        return Err(ConfigError::Validation(format!(
            "pages must be >= 1, got {}",
            config.pages
        )));
    }

    if config.pages > 1 && config.step < 1 {
        return Err(ConfigError::Validation(
            "step must be >= 1 when crawling more than one page".to_string(),
        ));
    }

    let last_offset = u64::from(config.start)
        + u64::from(config.pages - 1) * u64::from(config.step);
    if last_offset > u64::from(u32::MAX) {
        return Err(ConfigError::Validation(format!(
            "start + (pages - 1) * step overflows, got {}",
            last_offset
        )));
    }

    if config.sort.trim().is_empty() {
        return Err(ConfigError::Validation("sort cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates delay, timeout, retries and user agent
fn validate_request_settings(config: &Config) -> Result<(), ConfigError> {
    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1 second, got {}",
            config.timeout
        )));
    }

    if config.retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "retries must be <= {}, got {}",
            MAX_RETRIES, config.retries
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that the match pattern is present and compiles
fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "match pattern cannot be empty".to_string(),
        ));
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

    Ok(())
}

/// Validates the output descriptor
fn validate_output(config: &Config) -> Result<(), ConfigError> {
    if config.output.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output cannot be empty (use '-' for stdout)".to_string(),
        ));
    }

    Ok(())
}

use crate::config::types::{Config, CrawlerConfig, ModelConfig, RendererConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_model_config(&config.model)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "bind-address '{}' is not a socket address: {}",
            config.bind_address, e
        ))
    })?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_pages_limit < config.max_pages {
        return Err(ConfigError::Validation(format!(
            "max-pages-limit ({}) must be >= max-pages ({})",
            config.max_pages_limit, config.max_pages
        )));
    }

    if config.link_fan_out < 1 {
        return Err(ConfigError::Validation(format!(
            "link-fan-out must be >= 1, got {}",
            config.link_fan_out
        )));
    }

    if config.render_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "render-timeout-ms must be >= 1000ms, got {}ms",
            config.render_timeout_ms
        )));
    }

    Ok(())
}

fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates model configuration
fn validate_model_config(config: &ModelConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "model name cannot be empty".to_string(),
        ));
    }

    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid model endpoint: {}", e)))?;
    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Model endpoint must be HTTP(S), got '{}'",
            config.endpoint
        )));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api-key-env cannot be empty".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.max_output_tokens < 1 {
        return Err(ConfigError::Validation(
            "max-output-tokens must be >= 1".to_string(),
        ));
    }

    if config.quota_patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "quota-patterns cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

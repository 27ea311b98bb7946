use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Source URL is http(s), page limit, timeout and batch size are non-zero
/// - Cache URL names a known backend
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = &config.source.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "source.base_url must be an http(s) URL (got '{}')",
            base_url
        )));
    }

    if config.source.page_limit == 0 {
        return Err(ConfigError::ValidationError(
            "source.page_limit cannot be 0".to_string(),
        ));
    }

    if config.source.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.source.detail_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "source.detail_batch_size cannot be 0".to_string(),
        ));
    }

    config.cache.backend()?;

    Ok(())
}

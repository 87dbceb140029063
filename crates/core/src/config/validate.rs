use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Remote base URL is an http(s) URL
/// - Request timeout is not 0
/// - At least one extension is accepted for each input
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.remote.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "remote.base_url must be an http(s) URL, got '{}'",
            config.remote.base_url
        )));
    }

    if config.remote.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "remote.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config
        .validation
        .project_extension
        .trim_start_matches('.')
        .is_empty()
    {
        return Err(ConfigError::ValidationError(
            "validation.project_extension cannot be empty".to_string(),
        ));
    }

    if !config
        .validation
        .transcript_extensions
        .iter()
        .any(|ext| !ext.trim_start_matches('.').is_empty())
    {
        return Err(ConfigError::ValidationError(
            "validation.transcript_extensions must list at least one extension".to_string(),
        ));
    }

    Ok(())
}

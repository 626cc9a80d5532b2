use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Sheets section exists (enforced by serde)
/// - Server port is not 0
/// - Retry/timeout settings are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Sheets validation
    if config.sheets.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "sheets.max_attempts must be at least 1".to_string(),
        ));
    }
    if config.sheets.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "sheets.timeout_ms cannot be 0".to_string(),
        ));
    }
    if config.sheets.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sheets.refresh_interval_secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

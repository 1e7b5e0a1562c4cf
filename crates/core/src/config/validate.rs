use super::{types::Config, ConfigError};
use crate::orchestrator::{MAX_WAIT_RANGE_SECS, POLL_INTERVAL_RANGE_SECS};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Marble base URL is set
/// - Generation defaults fall inside the generate-world node ranges
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.marble.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "marble.base_url cannot be empty".to_string(),
        ));
    }

    if !POLL_INTERVAL_RANGE_SECS.contains(&config.generation.poll_interval_secs) {
        return Err(ConfigError::ValidationError(format!(
            "generation.poll_interval_secs must be within {}..={}",
            POLL_INTERVAL_RANGE_SECS.start(),
            POLL_INTERVAL_RANGE_SECS.end()
        )));
    }

    if !MAX_WAIT_RANGE_SECS.contains(&config.generation.max_wait_secs) {
        return Err(ConfigError::ValidationError(format!(
            "generation.max_wait_secs must be within {}..={}",
            MAX_WAIT_RANGE_SECS.start(),
            MAX_WAIT_RANGE_SECS.end()
        )));
    }

    Ok(())
}

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable conventionally holding the Marble API key
pub const API_KEY_ENV: &str = "WORLDLABS_API_KEY";

/// Load configuration from file with environment variable overrides.
///
/// `WORLDFORGE_SECTION__KEY` overrides `[section] key`, and
/// `WORLDLABS_API_KEY` fills `marble.api_key`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment_for(Toml::file(path))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn figment_for(file: figment::providers::Data<Toml>) -> Figment {
    Figment::new()
        .merge(file)
        .merge(
            Env::raw()
                .only(&[API_KEY_ENV])
                .map(|_| "marble.api_key".into()),
        )
        .merge(Env::prefixed("WORLDFORGE_").split("__"))
}

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::orchestrator::WorldModel;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub marble: MarbleConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Marble API connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarbleConfig {
    /// API root (default: https://api.worldlabs.ai/marble/v1)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key. Also read from `WORLDLABS_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds (default: 60)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for MarbleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://api.worldlabs.ai/marble/v1";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    60
}

/// Defaults applied to generate-world invocations that leave a field unset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub model: WorldModel,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: WorldModel::default(),
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
        }
    }
}

fn default_poll_interval() -> u64 {
    15
}

fn default_max_wait() -> u64 {
    600
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8188
}

/// Where downloads and viewer pages are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub marble: SanitizedMarbleConfig,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

/// Marble config with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMarbleConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub request_timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            marble: SanitizedMarbleConfig {
                base_url: config.marble.base_url.clone(),
                api_key_configured: config
                    .marble
                    .api_key
                    .as_deref()
                    .is_some_and(|k| !k.trim().is_empty()),
                request_timeout_secs: config.marble.request_timeout_secs,
            },
            generation: config.generation.clone(),
            server: config.server.clone(),
            output: config.output.clone(),
        }
    }
}

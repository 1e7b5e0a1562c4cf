//! Generation parameters and polling policy.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::GenerationError;

/// Accepted poll intervals for the generate-world node, in seconds.
pub const POLL_INTERVAL_RANGE_SECS: RangeInclusive<u64> = 5..=60;

/// Accepted deadlines for the generate-world node, in seconds.
pub const MAX_WAIT_RANGE_SECS: RangeInclusive<u64> = 60..=1800;

/// Marble model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldModel {
    #[serde(rename = "Marble 0.1-plus")]
    Plus,
    #[default]
    #[serde(rename = "Marble 0.1-mini")]
    Mini,
}

impl WorldModel {
    pub const ALL: [WorldModel; 2] = [WorldModel::Plus, WorldModel::Mini];

    /// Name sent in the generate request.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorldModel::Plus => "Marble 0.1-plus",
            WorldModel::Mini => "Marble 0.1-mini",
        }
    }
}

impl std::fmt::Display for WorldModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorldModel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorldModel::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| GenerationError::Configuration(format!("unknown model: {}", s)))
    }
}

/// What to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default)]
    pub model: WorldModel,
    #[serde(default)]
    pub is_panorama: bool,
    /// Optional guidance; trimmed, dropped when blank.
    #[serde(default)]
    pub text_prompt: Option<String>,
}

fn default_display_name() -> String {
    "My World".to_string()
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            model: WorldModel::default(),
            is_panorama: false,
            text_prompt: None,
        }
    }
}

/// How often to poll and how long to wait for a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl PollPolicy {
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            max_wait,
        }
    }

    /// Build from node inputs, enforcing the node's ranges.
    pub fn from_node_inputs(
        poll_interval_secs: u64,
        max_wait_secs: u64,
    ) -> Result<Self, GenerationError> {
        if !POLL_INTERVAL_RANGE_SECS.contains(&poll_interval_secs) {
            return Err(GenerationError::Configuration(format!(
                "poll_interval must be between {} and {} seconds, got {}",
                POLL_INTERVAL_RANGE_SECS.start(),
                POLL_INTERVAL_RANGE_SECS.end(),
                poll_interval_secs
            )));
        }
        if !MAX_WAIT_RANGE_SECS.contains(&max_wait_secs) {
            return Err(GenerationError::Configuration(format!(
                "max_wait_time must be between {} and {} seconds, got {}",
                MAX_WAIT_RANGE_SECS.start(),
                MAX_WAIT_RANGE_SECS.end(),
                max_wait_secs
            )));
        }
        Ok(Self::new(
            Duration::from_secs(poll_interval_secs),
            Duration::from_secs(max_wait_secs),
        ))
    }

    /// Upper bound on status requests before the deadline trips.
    pub fn max_polls(&self) -> u64 {
        if self.poll_interval.is_zero() {
            return u64::MAX;
        }
        let interval = self.poll_interval.as_nanos();
        let ceil = self.max_wait.as_nanos().div_ceil(interval);
        u64::try_from(ceil).unwrap_or(u64::MAX).saturating_add(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(15), Duration::from_secs(600))
    }
}

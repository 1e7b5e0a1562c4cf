//! API key handling.

use crate::orchestrator::GenerationError;

/// Marble API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, trimming surrounding whitespace. Blank keys are rejected.
    pub fn new(key: impl Into<String>) -> Result<Self, GenerationError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(missing_key());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Pick the first non-blank key: the one supplied with the invocation,
    /// then the configured one.
    pub fn resolve(
        explicit: Option<&str>,
        configured: Option<&str>,
    ) -> Result<Self, GenerationError> {
        [explicit, configured]
            .into_iter()
            .flatten()
            .find(|k| !k.trim().is_empty())
            .map(|k| Self(k.trim().to_string()))
            .ok_or_else(missing_key)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

fn missing_key() -> GenerationError {
    GenerationError::Configuration(
        "no API key provided: pass api_key with the request, set [marble] api_key, \
         or export WORLDLABS_API_KEY"
            .to_string(),
    )
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

//! Manager configuration
//!
//! Defaults match the coordinator's historical behaviour: a 5000 character
//! ceiling, `auto` source language, 1000 character chunks for backends that
//! do not advertise a limit, and no request timeout.

use crate::error::{MtError, MtResult};
use crate::translator::{AUTO_LOCALE, LanguagePair};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MAX_LEN: usize = 5000;
pub const DEFAULT_CHUNK_LEN: usize = 1000;
pub const DEFAULT_TARGET: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Longest text (in characters) `translate` accepts
    pub max_len: usize,
    pub default_from: String,
    pub default_to: String,
    /// Chunk length used when the backend reports no limit
    pub fallback_chunk_len: usize,
    /// Per backend call; `None` waits forever
    pub request_timeout_ms: Option<u64>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            default_from: AUTO_LOCALE.to_string(),
            default_to: DEFAULT_TARGET.to_string(),
            fallback_chunk_len: DEFAULT_CHUNK_LEN,
            request_timeout_ms: None,
        }
    }
}

impl ManagerConfig {
    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> MtResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MtError::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> MtResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MtError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by `TRANSWITCH_*` environment variables
    pub fn from_env() -> MtResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `TRANSWITCH_MAX_LEN`, `TRANSWITCH_FROM`, `TRANSWITCH_TO` and
    /// `TRANSWITCH_TIMEOUT_MS` on top of `self`
    pub fn with_env_overrides(mut self) -> MtResult<Self> {
        if let Ok(value) = std::env::var("TRANSWITCH_MAX_LEN") {
            self.max_len = parse_number("TRANSWITCH_MAX_LEN", &value)? as usize;
        }
        if let Ok(value) = std::env::var("TRANSWITCH_FROM") {
            self.default_from = value;
        }
        if let Ok(value) = std::env::var("TRANSWITCH_TO") {
            self.default_to = value;
        }
        if let Ok(value) = std::env::var("TRANSWITCH_TIMEOUT_MS") {
            self.request_timeout_ms = Some(parse_number("TRANSWITCH_TIMEOUT_MS", &value)?);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> MtResult<()> {
        if self.max_len == 0 {
            return Err(MtError::ConfigError("max_len must be positive".to_string()));
        }
        if self.fallback_chunk_len == 0 {
            return Err(MtError::ConfigError(
                "fallback_chunk_len must be positive".to_string(),
            ));
        }
        if self.default_to.trim().is_empty() {
            return Err(MtError::ConfigError(
                "default_to cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_options(&self) -> LanguagePair {
        let from = if self.default_from.trim().is_empty() {
            AUTO_LOCALE
        } else {
            self.default_from.as_str()
        };
        LanguagePair::new(from, self.default_to.as_str())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_number(name: &str, value: &str) -> MtResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| MtError::ConfigError(format!("{} must be a number, got '{}'", name, value)))
}

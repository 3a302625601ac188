//! Runtime configuration.

use avalia_core::{ConfigError, ParserConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// How long a response source may take for one job.
    #[serde(with = "humantime_serde")]
    pub source_timeout: Duration,

    /// Raw responses longer than this (in chars) are truncated before parsing.
    pub max_response_chars: usize,

    pub cache: CacheConfig,

    pub parser: ParserConfig,
}

/// Parsed-report cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub max_entries: u64,

    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(120),
            max_response_chars: 200_000,
            cache: CacheConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl RuntimeConfig {
    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_timeout.is_zero() {
            return Err(invalid("source_timeout", "must be greater than zero"));
        }
        if self.max_response_chars == 0 {
            return Err(invalid("max_response_chars", "must be greater than zero"));
        }
        if self.cache.ttl.is_zero() {
            return Err(invalid("cache.ttl", "must be greater than zero"));
        }
        self.parser.validate()
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Durations written as "30s", "2m", "1h 30m".
mod humantime_serde {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(D::Error::custom)
    }
}

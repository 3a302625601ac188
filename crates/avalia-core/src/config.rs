//! Parser configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Tuning knobs for [`CriteriaResponseParser`](crate::CriteriaResponseParser).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Fraction of requested criteria a pass must find before the parser
    /// stops escalating to looser heading grammars.
    pub min_section_ratio: f64,

    /// Ignore heading-shaped lines inside fenced code blocks.
    pub skip_code_fences: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_section_ratio: 0.75,
            skip_code_fences: true,
        }
    }
}

impl ParserConfig {
    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_section_ratio > 0.0 && self.min_section_ratio <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "min_section_ratio".to_string(),
                reason: format!("must be in (0, 1], got {}", self.min_section_ratio),
            });
        }
        Ok(())
    }

    /// Minimum number of sections a pass must yield for `requested` criteria.
    pub(crate) fn required_sections(&self, requested: usize) -> usize {
        let required = (requested as f64 * self.min_section_ratio).ceil() as usize;
        required.clamp(1, requested.max(1))
    }
}

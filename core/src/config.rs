//! config.rs
//! Registry / dispatch configuration.
//!
//! Every field is optional in JSON; missing fields take the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::types::CodecKind;
use crate::constants::{DEFAULT_MAX_OUTPUT_LEN, DEFAULT_MAX_SOURCE_LEN};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Codecs the registry registers a backend for.
    pub enabled: Vec<CodecKind>,

    /// Largest source buffer the facade accepts.
    pub max_source_len: usize,

    /// Largest buffer `decompress_to_vec` allocates.
    pub max_output_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enabled: CodecKind::ALL.to_vec(),
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }
}

impl RegistryConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_source_len == 0 {
            return Err(ConfigError::Validation("max_source_len must be > 0".into()));
        }
        if self.max_output_len == 0 {
            return Err(ConfigError::Validation("max_output_len must be > 0".into()));
        }
        Ok(())
    }

    pub fn is_enabled(&self, kind: CodecKind) -> bool {
        self.enabled.contains(&kind)
    }
}

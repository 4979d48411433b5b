//! Converter settings.

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::utils::{ConverterError, ConverterResult};

/// Settings for the conversion engine.
///
/// Missing fields in a JSON document fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl ConverterConfig {
    /// Parses and validates a JSON settings document.
    pub fn from_json(json: &str) -> ConverterResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConverterResult<Self> {
        let path = path.as_ref();
        debug!("Loading converter config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> ConverterResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConverterError::config(
                format!("Invalid quality value: {}. Must be between 1 and 100", self.jpeg_quality)
            ));
        }

        Ok(())
    }
}

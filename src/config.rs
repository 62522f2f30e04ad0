//! Export configuration. Everything has a default; a TOML file may override any subset.
//!
//! ```toml
//! transmitter_pin = "GPIO4"
//! carrier_duty_percent = 33
//! generator = "My Remote Library"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// GPIO pin of the IR LED written into the `remote_transmitter` block.
    pub transmitter_pin: String,
    pub carrier_duty_percent: u8,
    /// Name in the "Generated by" header line and the JSON format tag.
    pub generator: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            transmitter_pin: "GPIO14".to_string(),
            carrier_duty_percent: 50,
            generator: "Remote Control Hub".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = toml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded export config");
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.carrier_duty_percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "carrier_duty_percent must be at most 100 (got {})",
                self.carrier_duty_percent
            )));
        }
        if self.transmitter_pin.trim().is_empty() {
            return Err(ConfigError::Invalid("transmitter_pin must not be empty".to_string()));
        }
        Ok(())
    }
}

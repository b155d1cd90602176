//! Run-parameter configuration.
//!
//! Component graphs are built in code, but run parameters can come from a
//! YAML or JSON file so that sweeps and deployments do not require a
//! rebuild.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! quit_time: 1000
//! log_level: debug
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SimTime;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global run parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimParams {
    /// Tick after which the run terminates; zero means run until no events
    /// remain.
    #[serde(default)]
    pub quit_time: SimTime,

    /// Logging level for subscribers set up by the host application
    /// (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            quit_time: 0,
            log_level: default_log_level(),
        }
    }
}

impl SimParams {
    /// Parses parameters from a YAML string.
    pub fn from_yaml_str(input: &str) -> ConfigResult<Self> {
        let params: SimParams = serde_yaml::from_str(input)?;
        params.validate()?;
        Ok(params)
    }

    /// Parses parameters from a JSON string.
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        let params: SimParams = serde_json::from_str(input)?;
        params.validate()?;
        Ok(params)
    }

    /// Loads parameters from a file, selecting the format by extension
    /// (`.yaml`/`.yml` or `.json`).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext @ ("yaml" | "yml" | "json")) => ext,
            other => {
                return Err(ConfigError::UnknownFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        let content = std::fs::read_to_string(path)?;
        if format == "json" {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Validates the parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.quit_time == SimTime::MAX {
            tracing::warn!("quit_time is the no-event sentinel; treating it as a deadline anyway");
        }
        Ok(())
    }
}

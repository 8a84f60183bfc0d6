//! Emitter and logging configuration (JSON5).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::contracts::SdkVersion;
use crate::error::ConfigError;
use crate::severity::LevelMap;

/// Emitter options that can live in a configuration file.
///
/// The client handle itself is supplied in code, see [`ClientBinding`](crate::ClientBinding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Minimum façade level this transport accepts.
    #[serde(default = "default_level")]
    pub level: String,

    /// Suppress all emission.
    #[serde(default)]
    pub silent: bool,

    /// Also send error-severity records carrying an error as exceptions.
    #[serde(default = "default_true")]
    pub send_errors_as_exceptions: bool,

    /// Custom level map. Replaces the built-in one.
    #[serde(default)]
    pub levels: Option<LevelMap>,

    /// Expected SDK major version of the client (2 or 3).
    #[serde(default)]
    pub version: Option<SdkVersion>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            silent: false,
            send_errors_as_exceptions: true,
            levels: None,
            version: None,
        }
    }
}

impl EmitterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EmitterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::Validation("level cannot be empty".to_string()));
        }

        if let Some(levels) = &self.levels
            && levels.is_empty()
        {
            return Err(ConfigError::Validation(
                "levels must map at least one level name".to_string(),
            ));
        }

        Ok(())
    }

    /// The level map in effect.
    pub fn level_map(&self) -> LevelMap {
        self.levels.clone().unwrap_or_default()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

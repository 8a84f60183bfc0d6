//! Configuration for the demo binary.

use serde::{Deserialize, Serialize};
use std::path::Path;

use insightlog::{ConfigError, EmitterConfig, LoggingConfig, SdkVersion};

/// Complete demo configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Transport settings.
    #[serde(default)]
    pub transport: EmitterConfig,

    /// Echo every record to stdout as JSON, next to the telemetry client.
    #[serde(default)]
    pub console: Option<bool>,

    /// Diagnostic logging of the demo itself.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DemoConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = json5::from_str(content)?;
        config.transport.validate()?;
        Ok(config)
    }

    /// SDK version to bind, defaulting to 3.
    pub fn version(&self) -> SdkVersion {
        self.transport.version.unwrap_or(SdkVersion::V3)
    }

    /// Whether to echo records to the console.
    ///
    /// Defaults to on when not running on Azure.
    pub fn console_enabled(&self) -> bool {
        self.console.unwrap_or_else(insightlog::is_running_locally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let config = DemoConfig::parse("{}").unwrap();

        assert_eq!(config.version(), SdkVersion::V3);
        assert_eq!(config.transport.level, "info");
        assert!(config.console.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            transport: {
                level: "debug",
                version: 2,
                send_errors_as_exceptions: false,
            },
            console: false,
            logging: { level: "trace", format: "json" },
        }"#;

        let config = DemoConfig::parse(json).unwrap();

        assert_eq!(config.version(), SdkVersion::V2);
        assert_eq!(config.transport.level, "debug");
        assert!(!config.transport.send_errors_as_exceptions);
        assert!(!config.console_enabled());
        assert_eq!(config.logging.format, insightlog::LogFormat::Json);
    }

    #[test]
    fn test_invalid_transport_rejected() {
        let result = DemoConfig::parse(r#"{ transport: { level: "" } }"#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ console: true }}").unwrap();

        let config = DemoConfig::load_from_file(file.path()).unwrap();
        assert!(config.console_enabled());
    }
}

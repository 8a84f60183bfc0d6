//! Connection strings and hosting detection.

use std::collections::HashMap;

use crate::error::ConnectionError;

/// Environment variable holding the connection string.
pub const CONNECTION_STRING_ENV: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";

/// Environment variable set on Azure App Service instances.
pub const WEBSITE_INSTANCE_ID_ENV: &str = "WEBSITE_INSTANCE_ID";

const INSTRUMENTATION_KEY: &str = "instrumentationkey";
const INGESTION_ENDPOINT: &str = "ingestionendpoint";

/// Parsed `Key=Value;Key=Value` connection string.
///
/// Keys are case-insensitive. `InstrumentationKey` is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    segments: HashMap<String, String>,
}

impl ConnectionString {
    /// Parse a connection string.
    pub fn parse(s: &str) -> Result<Self, ConnectionError> {
        let mut segments = HashMap::new();

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let Some((key, value)) = segment.split_once('=') else {
                return Err(ConnectionError::Malformed(segment.to_string()));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConnectionError::Malformed(segment.to_string()));
            }
            segments.insert(key.to_lowercase(), value.trim().to_string());
        }

        match segments.get(INSTRUMENTATION_KEY) {
            Some(key) if !key.is_empty() => Ok(Self { segments }),
            _ => Err(ConnectionError::MissingKey),
        }
    }

    /// Read the connection string from the environment.
    pub fn from_env() -> Result<Self, ConnectionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the connection string through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConnectionError> {
        let value = lookup(CONNECTION_STRING_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConnectionError::Missing(CONNECTION_STRING_ENV))?;
        Self::parse(&value)
    }

    pub fn instrumentation_key(&self) -> &str {
        self.segments
            .get(INSTRUMENTATION_KEY)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn ingestion_endpoint(&self) -> Option<&str> {
        self.get(INGESTION_ENDPOINT)
    }

    /// Any segment by key, case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.segments.get(&key.to_lowercase()).map(String::as_str)
    }
}

impl std::str::FromStr for ConnectionString {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether the process runs on Azure App Service.
pub fn is_running_in_azure() -> bool {
    std::env::var_os(WEBSITE_INSTANCE_ID_ENV).is_some()
}

/// Whether the process runs outside Azure App Service.
pub fn is_running_locally() -> bool {
    !is_running_in_azure()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_KEY: &str = "00000000-0000-0000-0000-000000000000";

    #[test]
    fn test_parse_minimal() {
        let conn = ConnectionString::parse(&format!("InstrumentationKey={FAKE_KEY}")).unwrap();

        assert_eq!(conn.instrumentation_key(), FAKE_KEY);
        assert_eq!(conn.ingestion_endpoint(), None);
    }

    #[test]
    fn test_parse_full() {
        let conn: ConnectionString = format!(
            "InstrumentationKey={FAKE_KEY};IngestionEndpoint=https://westeurope-5.in.applicationinsights.azure.com/;"
        )
        .parse()
        .unwrap();

        assert_eq!(
            conn.ingestion_endpoint(),
            Some("https://westeurope-5.in.applicationinsights.azure.com/")
        );
        assert_eq!(conn.get("INSTRUMENTATIONKEY"), Some(FAKE_KEY));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ConnectionString::parse("IngestionEndpoint=https://x"),
            Err(ConnectionError::MissingKey)
        );
        assert_eq!(
            ConnectionString::parse("InstrumentationKey="),
            Err(ConnectionError::MissingKey)
        );
        assert_eq!(
            ConnectionString::parse("garbage"),
            Err(ConnectionError::Malformed("garbage".to_string()))
        );
    }

    #[test]
    fn test_from_lookup() {
        let missing = ConnectionString::from_lookup(|_| None);
        assert_eq!(missing, Err(ConnectionError::Missing(CONNECTION_STRING_ENV)));

        let found = ConnectionString::from_lookup(|name| {
            (name == CONNECTION_STRING_ENV).then(|| format!("InstrumentationKey={FAKE_KEY}"))
        })
        .unwrap();
        assert_eq!(found.instrumentation_key(), FAKE_KEY);
    }
}

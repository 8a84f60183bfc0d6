//! Error types for the insightlog transport.
//!
//! Only construction can fail. Per-call anomalies (unknown level names, a
//! missing error payload, filter vetoes) never produce an error.

use thiserror::Error;

use crate::contracts::SdkVersion;

/// Result type alias using [`EmitterError`].
pub type Result<T> = std::result::Result<T, EmitterError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Failed to initialize tracing: {0}")]
    Tracing(String),
}

/// Connection string errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// No connection string was supplied and none was found in the environment.
    #[error("No connection string found in {0}")]
    Missing(&'static str),

    /// A segment was not of the form `key=value`.
    #[error("Malformed connection string segment: {0:?}")]
    Malformed(String),

    /// The connection string does not carry an instrumentation key.
    #[error("Connection string has no InstrumentationKey")]
    MissingKey,
}

/// Errors raised while building an emitter.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The configured SDK version disagrees with the client binding.
    #[error("Configured for SDK {configured} but the client is bound as SDK {bound}")]
    VersionMismatch {
        configured: SdkVersion,
        bound: SdkVersion,
    },
}

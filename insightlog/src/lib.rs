//! Application Insights log transport.
//!
//! This crate turns structured log records handed over by a logging façade
//! into Application Insights telemetry: one trace per record and, for records
//! at `Error` severity or above that carry an error, one exception.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │   Façade    │────>│     Emitter      │────>│ TelemetryClient  │
//! │ (LogRecord) │     │ (trace/exception)│     │   (SDK v2/v3)    │
//! └─────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! - [`severity`] - Severity scale and level name mapping
//! - [`value`] - Values carried by records (`LogValue`, `ErrorValue`)
//! - [`properties`] - Property bag extraction and merging
//! - [`contracts`] - SDK 2.x / 3.x telemetry shapes and the client trait
//! - [`filter`] - Filter chain that can veto telemetry
//! - [`emitter`] - The transport itself
//! - [`client`] - In-memory and JSON-lines clients
//! - [`connection`] - Connection strings and hosting detection
//! - [`config`] - JSON5 configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use insightlog::{ClientBinding, Emitter, LogRecord, MemoryClient, V3};
//!
//! let client = Arc::new(MemoryClient::<V3>::new());
//! let emitter = Emitter::with_defaults(ClientBinding::v3(client.clone()));
//!
//! emitter.log(&LogRecord::new("info", "hello world"), || {});
//! assert_eq!(client.traces()[0].message, "hello world");
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod contracts;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod properties;
pub mod record;
pub mod severity;
pub mod value;

// Re-export commonly used types at the crate root
pub use client::{JsonLinesClient, MemoryClient};
pub use config::{EmitterConfig, LogFormat, LoggingConfig};
pub use connection::{
    CONNECTION_STRING_ENV, ConnectionString, is_running_in_azure, is_running_locally,
};
pub use contracts::{
    Contract, ExceptionTelemetry, KnownSeverityLevel, SdkVersion, TelemetryClient, TraceTelemetry,
    V2, V3,
};
pub use emitter::{Channel, ClientBinding, Emitter};
pub use error::{ConfigError, ConnectionError, EmitterError, Result};
pub use filter::{ExceptionFilterFn, FilterChain, IdentityFilter, TelemetryFilter, TraceFilterFn};
pub use record::LogRecord;
pub use severity::{LevelMap, SeverityLevel};
pub use value::{ErrorValue, LogValue, ObjectValue, PropertyBag};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> std::result::Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init()
            .map_err(|e| ConfigError::Tracing(e.to_string())),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init()
            .map_err(|e| ConfigError::Tracing(e.to_string())),
    }
}

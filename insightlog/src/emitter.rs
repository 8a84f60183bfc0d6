//! The log transport: turns log records into trace and exception telemetry.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::client::JsonLinesClient;
use crate::config::EmitterConfig;
use crate::connection::ConnectionString;
use crate::contracts::{
    Contract, ExceptionTelemetry, SdkVersion, TelemetryClient, TraceTelemetry, V2, V3,
};
use crate::error::{EmitterError, Result};
use crate::filter::FilterChain;
use crate::properties::{exception_properties, find_error, trace_properties};
use crate::record::LogRecord;
use crate::severity::{LevelMap, SeverityLevel};

/// A client of one SDK version together with its filters.
pub struct Channel<C: Contract> {
    client: Arc<dyn TelemetryClient<C>>,
    filters: FilterChain<C>,
}

impl<C: Contract> Channel<C> {
    /// Bind a client with no filters.
    pub fn new<T: TelemetryClient<C> + 'static>(client: Arc<T>) -> Self {
        Self::from_shared(client)
    }

    /// Bind an already type-erased client.
    pub fn from_shared(client: Arc<dyn TelemetryClient<C>>) -> Self {
        Self {
            client,
            filters: FilterChain::new(),
        }
    }

    /// Replace the filter chain.
    pub fn with_filters(mut self, filters: FilterChain<C>) -> Self {
        self.filters = filters;
        self
    }

    /// Run the filters and send the trace. Returns `false` when vetoed.
    fn track_trace(&self, mut telemetry: TraceTelemetry<C>) -> bool {
        if !self.filters.allows_trace(&mut telemetry, self.client.as_ref()) {
            return false;
        }
        self.client.track_trace(telemetry);
        true
    }

    /// Run the filters and send the exception. Returns `false` when vetoed.
    fn track_exception(&self, mut telemetry: ExceptionTelemetry<C>) -> bool {
        if !self
            .filters
            .allows_exception(&mut telemetry, self.client.as_ref())
        {
            return false;
        }
        self.client.track_exception(telemetry);
        true
    }
}

impl<C: Contract> std::fmt::Debug for Channel<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("version", &C::VERSION)
            .field("filters", &self.filters)
            .finish()
    }
}

/// The client an emitter talks to, tagged with its SDK major version.
#[derive(Debug)]
pub enum ClientBinding {
    V2(Channel<V2>),
    V3(Channel<V3>),
}

impl ClientBinding {
    /// Bind an SDK 2.x client.
    pub fn v2<T: TelemetryClient<V2> + 'static>(client: Arc<T>) -> Self {
        ClientBinding::V2(Channel::new(client))
    }

    /// Bind an SDK 3.x client.
    pub fn v3<T: TelemetryClient<V3> + 'static>(client: Arc<T>) -> Self {
        ClientBinding::V3(Channel::new(client))
    }

    pub fn version(&self) -> SdkVersion {
        match self {
            ClientBinding::V2(_) => SdkVersion::V2,
            ClientBinding::V3(_) => SdkVersion::V3,
        }
    }
}

impl From<Channel<V2>> for ClientBinding {
    fn from(channel: Channel<V2>) -> Self {
        ClientBinding::V2(channel)
    }
}

impl From<Channel<V3>> for ClientBinding {
    fn from(channel: Channel<V3>) -> Self {
        ClientBinding::V3(channel)
    }
}

/// Log transport forwarding records to an Application Insights client.
///
/// Every record produces one trace. Records at `Error` severity or above that
/// carry an error also produce an exception, unless that is switched off.
/// The binding, level map and filters are fixed at construction, so one
/// emitter can be shared between threads.
pub struct Emitter {
    binding: ClientBinding,
    levels: LevelMap,
    level: String,
    silent: bool,
    send_errors_as_exceptions: bool,
}

impl Emitter {
    /// Transport name reported to the façade.
    pub const NAME: &'static str = "applicationinsightslogger";

    /// Create an emitter with default options.
    pub fn with_defaults(binding: impl Into<ClientBinding>) -> Self {
        let config = EmitterConfig::default();
        Self::build(binding.into(), &config)
    }

    /// Create an emitter from configuration.
    ///
    /// Fails when the configuration is invalid or names a different SDK
    /// version than the binding.
    pub fn new(binding: impl Into<ClientBinding>, config: &EmitterConfig) -> Result<Self> {
        let binding = binding.into();
        config.validate()?;

        if let Some(configured) = config.version
            && configured != binding.version()
        {
            return Err(EmitterError::VersionMismatch {
                configured,
                bound: binding.version(),
            });
        }

        Ok(Self::build(binding, config))
    }

    /// Create an emitter writing JSON lines, tagged with the connection string
    /// found in `APPLICATIONINSIGHTS_CONNECTION_STRING`.
    ///
    /// The SDK version comes from the configuration, defaulting to 3. Fails
    /// when the variable is absent or has no instrumentation key.
    pub fn from_env<W: Write + Send + 'static>(writer: W, config: &EmitterConfig) -> Result<Self> {
        Self::from_lookup(writer, config, |name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup<W: Write + Send + 'static>(
        writer: W,
        config: &EmitterConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        config.validate()?;
        let connection = ConnectionString::from_lookup(lookup)?;

        let binding = match config.version.unwrap_or(SdkVersion::V3) {
            SdkVersion::V2 => ClientBinding::v2(Arc::new(
                JsonLinesClient::<V2, W>::new(writer).with_connection(&connection),
            )),
            SdkVersion::V3 => ClientBinding::v3(Arc::new(
                JsonLinesClient::<V3, W>::new(writer).with_connection(&connection),
            )),
        };

        Self::new(binding, config)
    }

    fn build(binding: ClientBinding, config: &EmitterConfig) -> Self {
        debug!(
            version = %binding.version(),
            level = %config.level,
            silent = config.silent,
            send_errors_as_exceptions = config.send_errors_as_exceptions,
            "Application Insights transport created"
        );

        Self {
            binding,
            levels: config.level_map(),
            level: config.level.clone(),
            silent: config.silent,
            send_errors_as_exceptions: config.send_errors_as_exceptions,
        }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Minimum façade level this transport accepts.
    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn sends_errors_as_exceptions(&self) -> bool {
        self.send_errors_as_exceptions
    }

    pub fn version(&self) -> SdkVersion {
        self.binding.version()
    }

    pub fn binding(&self) -> &ClientBinding {
        &self.binding
    }

    /// Resolve a level name to a severity. Unknown names map to `Information`.
    pub fn severity(&self, level: &str) -> SeverityLevel {
        self.levels.resolve(level)
    }

    /// Emit telemetry for one record, then call `done`.
    ///
    /// `done` runs exactly once, whether or not anything was sent.
    pub fn log<F: FnOnce()>(&self, record: &LogRecord, done: F) {
        if !self.silent {
            let severity = self.severity(&record.level);
            match &self.binding {
                ClientBinding::V2(channel) => self.emit(channel, record, severity),
                ClientBinding::V3(channel) => self.emit(channel, record, severity),
            }
        }

        done();
    }

    fn emit<C: Contract>(&self, channel: &Channel<C>, record: &LogRecord, severity: SeverityLevel) {
        let candidate = find_error(record);

        let telemetry = TraceTelemetry {
            message: record.message.to_message_string(),
            severity: C::severity(severity),
            properties: trace_properties(record, candidate),
        };
        if channel.track_trace(telemetry) {
            trace!(level = %record.level, severity = %severity, "Trace tracked");
        } else {
            trace!(level = %record.level, "Trace dropped by filter");
        }

        if !self.send_errors_as_exceptions || !severity.is_exception_worthy() {
            return;
        }

        let Some(candidate) = candidate else {
            return;
        };

        let telemetry = ExceptionTelemetry::new(
            candidate.error.clone(),
            exception_properties(record, candidate),
        );
        if channel.track_exception(telemetry) {
            trace!(level = %record.level, source = ?candidate.source, "Exception tracked");
        } else {
            trace!(level = %record.level, "Exception dropped by filter");
        }
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("binding", &self.binding)
            .field("level", &self.level)
            .field("silent", &self.silent)
            .field("send_errors_as_exceptions", &self.send_errors_as_exceptions)
            .finish()
    }
}

//! Telemetry client implementations.
//!
//! Real SDK clients live outside this crate; these two cover tests and local
//! runs.

use std::io::Write;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::connection::ConnectionString;
use crate::contracts::{Contract, ExceptionTelemetry, SdkVersion, TelemetryClient, TraceTelemetry};

/// Client that keeps every tracked item in memory.
pub struct MemoryClient<C: Contract> {
    traces: Mutex<Vec<TraceTelemetry<C>>>,
    exceptions: Mutex<Vec<ExceptionTelemetry<C>>>,
}

impl<C: Contract> MemoryClient<C> {
    pub fn new() -> Self {
        Self {
            traces: Mutex::new(Vec::new()),
            exceptions: Mutex::new(Vec::new()),
        }
    }

    /// Traces tracked so far.
    pub fn traces(&self) -> Vec<TraceTelemetry<C>> {
        self.traces.lock().clone()
    }

    /// Exceptions tracked so far.
    pub fn exceptions(&self) -> Vec<ExceptionTelemetry<C>> {
        self.exceptions.lock().clone()
    }

    /// Forget everything tracked so far.
    pub fn reset(&self) {
        self.traces.lock().clear();
        self.exceptions.lock().clear();
    }
}

impl<C: Contract> Default for MemoryClient<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Contract> TelemetryClient<C> for MemoryClient<C> {
    fn track_trace(&self, telemetry: TraceTelemetry<C>) {
        self.traces.lock().push(telemetry);
    }

    fn track_exception(&self, telemetry: ExceptionTelemetry<C>) {
        self.exceptions.lock().push(telemetry);
    }
}

/// One line written by [`JsonLinesClient`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    version: SdkVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    instrumentation_key: Option<&'a str>,
    data: &'a T,
}

/// Client that writes each item as a JSON line.
///
/// Write failures are logged and swallowed; logging must never fail the caller.
pub struct JsonLinesClient<C: Contract, W: Write + Send> {
    writer: Mutex<W>,
    instrumentation_key: Option<String>,
    _contract: std::marker::PhantomData<fn() -> C>,
}

impl<C: Contract, W: Write + Send> JsonLinesClient<C, W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            instrumentation_key: None,
            _contract: std::marker::PhantomData,
        }
    }

    /// Tag every line with the instrumentation key of a connection string.
    pub fn with_connection(mut self, connection: &ConnectionString) -> Self {
        self.instrumentation_key = Some(connection.instrumentation_key().to_string());
        self
    }

    /// Consume the client and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_line<T: Serialize>(&self, kind: &'static str, data: &T) {
        let envelope = Envelope {
            kind,
            version: C::VERSION,
            instrumentation_key: self.instrumentation_key.as_deref(),
            data,
        };

        let line = match serde_json::to_string(&envelope) {
            Ok(line) => line,
            Err(e) => {
                warn!(kind, error = %e, "Failed to serialize telemetry");
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(kind, error = %e, "Failed to write telemetry");
        }
    }
}

impl<C: Contract, W: Write + Send> TelemetryClient<C> for JsonLinesClient<C, W> {
    fn track_trace(&self, telemetry: TraceTelemetry<C>) {
        self.write_line("trace", &telemetry);
    }

    fn track_exception(&self, telemetry: ExceptionTelemetry<C>) {
        self.write_line("exception", &telemetry);
    }
}

//! Replays a handful of typical log calls through the Application Insights transport.

mod config;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use insightlog::properties::{find_error, trace_properties};
use insightlog::{
    Channel, ClientBinding, ConnectionString, Contract, Emitter, ErrorValue, ExceptionTelemetry,
    FilterChain, JsonLinesClient, LogRecord, ObjectValue, PropertyBag, SdkVersion,
    TelemetryClient, TelemetryFilter, TraceTelemetry, V2, V3,
};

use crate::config::DemoConfig;

/// Façade level priorities, most severe first (npm order).
///
/// Syslog names sit next to their npm counterparts.
const FACADE_LEVELS: &[(&str, u8)] = &[
    ("emerg", 0),
    ("alert", 0),
    ("crit", 0),
    ("error", 0),
    ("warn", 1),
    ("warning", 1),
    ("info", 2),
    ("notice", 2),
    ("http", 3),
    ("verbose", 4),
    ("debug", 5),
    ("silly", 6),
];

/// Levels the console echo writes to stderr.
const STDERR_LEVELS: &[&str] = &["error", "crit", "alert", "emerg"];

/// Levels the console echo writes to stderr as warnings.
const CONSOLE_WARN_LEVELS: &[&str] = &["warn", "warning"];

/// Replay sample log calls through the Application Insights transport.
#[derive(Parser, Debug)]
#[command(name = "insightlog-demo")]
#[command(about = "Replay sample log calls through the Application Insights transport")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// Client SDK major version, 2 or 3 (overrides config).
    #[arg(long, value_parser = parse_sdk)]
    sdk: Option<SdkVersion>,

    /// Write telemetry to this file instead of stdout.
    #[arg(short, long)]
    output: Option<String>,

    /// Property keys to strip from telemetry before it is sent.
    #[arg(long)]
    redact: Vec<String>,

    /// Log level (trace, debug, info, warn, error) for the demo's own diagnostics.
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_sdk(s: &str) -> Result<SdkVersion, String> {
    s.parse::<u8>()
        .map_err(|e| e.to_string())
        .and_then(SdkVersion::try_from)
}

/// Removes configured keys from every item's properties.
struct Redact {
    keys: Vec<String>,
}

impl Redact {
    fn scrub(&self, properties: &mut PropertyBag) {
        for key in &self.keys {
            properties.remove(key);
        }
    }
}

impl<C: Contract> TelemetryFilter<C> for Redact {
    fn filter_trace(&self, trace: &mut TraceTelemetry<C>, _: &dyn TelemetryClient<C>) -> bool {
        self.scrub(&mut trace.properties);
        true
    }

    fn filter_exception(
        &self,
        exception: &mut ExceptionTelemetry<C>,
        _: &dyn TelemetryClient<C>,
    ) -> bool {
        self.scrub(&mut exception.properties);
        true
    }
}

fn channel<C: Contract>(
    writer: Box<dyn Write + Send>,
    connection: Option<&ConnectionString>,
    redact: &[String],
) -> Channel<C> {
    let mut client = JsonLinesClient::<C, _>::new(writer);
    if let Some(connection) = connection {
        client = client.with_connection(connection);
    }

    let mut filters = FilterChain::new();
    if !redact.is_empty() {
        filters = filters.with(Redact {
            keys: redact.to_vec(),
        });
    }

    Channel::new(Arc::new(client)).with_filters(filters)
}

fn priority(level: &str) -> Option<u8> {
    FACADE_LEVELS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, priority)| *priority)
}

/// Whether a record at `level` passes a façade threshold.
///
/// Names outside the façade's table are always dispatched; the transport
/// resolves them to `Information`.
fn is_enabled(threshold: &str, level: &str) -> bool {
    match (priority(threshold), priority(level)) {
        (Some(threshold), Some(level)) => level <= threshold,
        _ => true,
    }
}

fn writes_to_stderr(level: &str) -> bool {
    STDERR_LEVELS.contains(&level) || CONSOLE_WARN_LEVELS.contains(&level)
}

/// Print a record the way a JSON console transport would.
fn echo(record: &LogRecord) {
    let mut line = PropertyBag::new();
    line.insert("level".to_string(), Value::String(record.level.clone()));
    line.insert(
        "message".to_string(),
        Value::String(record.message.to_message_string()),
    );
    for (key, value) in trace_properties(record, find_error(record)) {
        line.entry(key).or_insert(value);
    }

    let line = Value::Object(line);
    if writes_to_stderr(&record.level) {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Dispatch every record the emitter's level lets through.
///
/// Returns how many records were dispatched.
fn replay(emitter: &Emitter, records: &[LogRecord], console: bool) -> usize {
    let mut dispatched = 0usize;
    for record in records {
        if !is_enabled(emitter.level(), &record.level) {
            debug!(level = %record.level, threshold = %emitter.level(), "Record below threshold");
            continue;
        }
        if console {
            echo(record);
        }
        emitter.log(record, || dispatched += 1);
    }
    dispatched
}

#[derive(Serialize)]
struct Answer {
    question: &'static str,
    answer: u32,
}

fn sample_records() -> serde_json::Result<Vec<LogRecord>> {
    let extended = ErrorValue::new("some error")
        .with_name("ExtendedError")
        .with_field("arg1", "answer")
        .with_field("arg2", 42);

    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "config.json5 not found");

    let meta = ObjectValue::from_serialize(&Answer {
        question: "Answer to the Ultimate Question of Life, the Universe, and Everything",
        answer: 42,
    })?;

    Ok(vec![
        LogRecord::new("info", "Let's log something new..."),
        LogRecord::new("error", "This is an error log!"),
        LogRecord::new("warn", "And this is a warning message."),
        LogRecord::new("info", "Log with some metadata").with_splat(meta),
        LogRecord::new("error", "Log extended errors with properties").with_splat(extended),
        LogRecord::new("crit", ErrorValue::from_error(&io_error)),
    ])
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        DemoConfig::load_from_file(config_path)?
    } else {
        DemoConfig::default()
    };

    // Override from CLI
    if let Some(sdk) = args.sdk {
        config.transport.version = Some(sdk);
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    insightlog::init_tracing(&config.logging)?;

    let connection = match ConnectionString::from_env() {
        Ok(connection) => Some(connection),
        Err(e) => {
            warn!(error = %e, "Telemetry will not be tagged with an instrumentation key");
            None
        }
    };

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };

    let version = config.version();
    let binding: ClientBinding = match version {
        SdkVersion::V2 => channel::<V2>(writer, connection.as_ref(), &args.redact).into(),
        SdkVersion::V3 => channel::<V3>(writer, connection.as_ref(), &args.redact).into(),
    };
    let emitter = Emitter::new(binding, &config.transport)?;
    let console = config.console_enabled();

    info!(
        version = %version,
        level = %emitter.level(),
        console,
        "Transport ready"
    );

    let records = sample_records()?;
    let dispatched = replay(&emitter, &records, console);

    info!(records = records.len(), dispatched, "Replay finished");
    Ok(())
}

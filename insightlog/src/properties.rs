//! Property extraction for trace and exception telemetry.
//!
//! Three sources feed a property bag: the record's own fields, the fields of
//! the error found on the call (if any), and the metadata argument. Later
//! sources win on key collisions: record fields, then error fields, then
//! metadata.

use serde_json::Value;

use crate::record::LogRecord;
use crate::value::{ErrorValue, LogValue, PropertyBag};

/// Where the error of a log call was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    /// The record itself is an error.
    Record,
    /// The message is an error.
    Message,
    /// The metadata argument is an error.
    Meta,
}

/// The error of a log call together with its origin.
#[derive(Debug, Clone, Copy)]
pub struct CandidateError<'a> {
    pub error: &'a ErrorValue,
    pub source: ErrorSource,
}

impl CandidateError<'_> {
    /// Whether the metadata argument is this very error.
    pub fn is_meta(&self) -> bool {
        self.source == ErrorSource::Meta
    }
}

/// Find the error of a log call: record, then message, then metadata.
pub fn find_error(record: &LogRecord) -> Option<CandidateError<'_>> {
    if let Some(error) = &record.error {
        return Some(CandidateError {
            error,
            source: ErrorSource::Record,
        });
    }
    if let Some(error) = record.message.as_error() {
        return Some(CandidateError {
            error,
            source: ErrorSource::Message,
        });
    }
    record
        .meta()
        .and_then(LogValue::as_error)
        .map(|error| CandidateError {
            error,
            source: ErrorSource::Meta,
        })
}

/// Record fields except `level` and `message`, normalized to JSON.
pub fn record_properties(record: &LogRecord) -> PropertyBag {
    record
        .fields
        .iter()
        .filter_map(|(key, value)| value.to_property_value().map(|v| (key.clone(), v)))
        .collect()
}

/// Error fields for a trace: every own field except `stack`, then the message.
///
/// The error's message always wins over an own field of the same name.
pub fn error_properties(error: &ErrorValue) -> PropertyBag {
    let mut props: PropertyBag = error
        .fields
        .iter()
        .filter(|(key, _)| key.as_str() != "stack")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    props.insert("message".to_string(), Value::String(error.message.clone()));
    props
}

/// Metadata fields, or nothing when there is no metadata argument.
pub fn meta_properties(record: &LogRecord) -> PropertyBag {
    record
        .meta()
        .map(LogValue::own_fields)
        .unwrap_or_default()
}

/// Build the trace property bag for a call.
pub fn trace_properties(record: &LogRecord, candidate: Option<CandidateError<'_>>) -> PropertyBag {
    let mut props = record_properties(record);

    if let Some(candidate) = candidate {
        props.extend(error_properties(candidate.error));
    }

    if !candidate.is_some_and(|c| c.is_meta()) {
        props.extend(meta_properties(record));
    }

    props
}

/// Build the exception property bag for a call.
///
/// A string message that differs from the error's own message is kept, so a
/// caption passed alongside the error is not lost.
pub fn exception_properties(record: &LogRecord, candidate: CandidateError<'_>) -> PropertyBag {
    let mut props = PropertyBag::new();

    if let Some(message) = record.message.as_str()
        && message != candidate.error.message
    {
        props.insert("message".to_string(), Value::String(message.to_string()));
    }

    if !candidate.is_meta() {
        props.extend(meta_properties(record));
    }

    props
}

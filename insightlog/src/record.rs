//! The inbound log record.

use std::collections::BTreeMap;

use crate::value::{ErrorValue, LogValue};

/// One log call as delivered by the façade.
///
/// The emitter only borrows a record for the duration of a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    /// Level name, e.g. `"error"` or `"info"`.
    pub level: String,
    /// Primary message.
    pub message: LogValue,
    /// Additional named fields. Never contains `level` or `message`.
    pub fields: BTreeMap<String, LogValue>,
    /// Set when the record itself is an error (the façade merged an error into it).
    pub error: Option<ErrorValue>,
    /// Extra positional arguments after the message.
    pub splat: Vec<LogValue>,
}

impl LogRecord {
    /// Create a record with a level and message.
    pub fn new(level: impl Into<String>, message: impl Into<LogValue>) -> Self {
        Self {
            level: level.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Add a named field. `level` and `message` are reserved and ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<LogValue>) -> Self {
        let key = key.into();
        if !is_reserved(&key) {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// Mark the record itself as an error.
    pub fn with_error(mut self, error: ErrorValue) -> Self {
        self.error = Some(error);
        self
    }

    /// Append a positional argument.
    pub fn with_splat(mut self, value: impl Into<LogValue>) -> Self {
        self.splat.push(value.into());
        self
    }

    /// The metadata argument: the first splat element, if any.
    pub fn meta(&self) -> Option<&LogValue> {
        self.splat.first()
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(key, "level" | "message")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_fields_are_ignored() {
        let record = LogRecord::new("info", "hello")
            .with_field("level", "error")
            .with_field("message", "other")
            .with_field("app", "api");

        assert_eq!(record.level, "info");
        assert_eq!(record.message.as_str(), Some("hello"));
        assert_eq!(record.fields.len(), 1);
        assert!(record.fields.contains_key("app"));
    }

    #[test]
    fn test_meta_is_first_splat() {
        let record = LogRecord::new("info", "hello")
            .with_splat("first")
            .with_splat("second");

        assert_eq!(record.meta().and_then(LogValue::as_str), Some("first"));
        assert!(LogRecord::new("info", "x").meta().is_none());
    }
}

//! Values carried by log records.
//!
//! A façade hands over arbitrary values. Instead of inspecting them at
//! runtime, callers wrap them in a [`LogValue`] that says up front whether a
//! value is plain JSON, a structured object, or an error.

use serde::Serialize;
use serde_json::{Map, Value};

/// Property bag attached to telemetry items.
pub type PropertyBag = Map<String, Value>;

/// A value passed to a log call.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LogValue {
    /// No value at all.
    #[default]
    Undefined,
    /// Plain JSON value (including `null`).
    Value(Value),
    /// Structured value that is not a plain map, e.g. a timestamp or a domain object.
    Object(ObjectValue),
    /// Error payload.
    Error(ErrorValue),
}

impl LogValue {
    /// The error payload, if this value is one.
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            LogValue::Error(err) => Some(err),
            _ => None,
        }
    }

    /// The string slice, if this value is a plain string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Coerce to text the way a log line would print it.
    ///
    /// `Undefined` becomes `"undefined"`, `null` becomes `"null"`, objects
    /// without a text form become `"[object Object]"` and errors render as
    /// `"Name: message"`.
    pub fn to_message_string(&self) -> String {
        match self {
            LogValue::Undefined => "undefined".to_string(),
            LogValue::Value(value) => coerce_json(value),
            LogValue::Object(obj) => obj
                .display
                .clone()
                .unwrap_or_else(|| OBJECT_TEXT.to_string()),
            LogValue::Error(err) => err.to_string(),
        }
    }

    /// Normalize to a plain JSON value for a property bag.
    ///
    /// Returns `None` for `Undefined`, which is dropped from bags.
    pub fn to_property_value(&self) -> Option<Value> {
        match self {
            LogValue::Undefined => None,
            LogValue::Value(value) => Some(value.clone()),
            LogValue::Object(obj) => Some(Value::Object(obj.fields.clone())),
            LogValue::Error(err) => Some(Value::Object(err.fields.clone())),
        }
    }

    /// Own fields this value contributes when merged into a bag.
    ///
    /// Primitives and arrays contribute nothing.
    pub fn own_fields(&self) -> PropertyBag {
        match self {
            LogValue::Value(Value::Object(map)) => map.clone(),
            LogValue::Object(obj) => obj.fields.clone(),
            LogValue::Error(err) => err.fields.clone(),
            _ => PropertyBag::new(),
        }
    }
}

const OBJECT_TEXT: &str = "[object Object]";

fn coerce_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_json(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => OBJECT_TEXT.to_string(),
    }
}

impl From<Value> for LogValue {
    fn from(v: Value) -> Self {
        LogValue::Value(v)
    }
}

impl From<&str> for LogValue {
    fn from(v: &str) -> Self {
        LogValue::Value(Value::String(v.to_string()))
    }
}

impl From<String> for LogValue {
    fn from(v: String) -> Self {
        LogValue::Value(Value::String(v))
    }
}

impl From<bool> for LogValue {
    fn from(v: bool) -> Self {
        LogValue::Value(Value::Bool(v))
    }
}

impl From<i64> for LogValue {
    fn from(v: i64) -> Self {
        LogValue::Value(Value::from(v))
    }
}

impl From<f64> for LogValue {
    fn from(v: f64) -> Self {
        LogValue::Value(Value::from(v))
    }
}

impl From<PropertyBag> for LogValue {
    fn from(v: PropertyBag) -> Self {
        LogValue::Value(Value::Object(v))
    }
}

impl From<ObjectValue> for LogValue {
    fn from(v: ObjectValue) -> Self {
        LogValue::Object(v)
    }
}

impl From<ErrorValue> for LogValue {
    fn from(v: ErrorValue) -> Self {
        LogValue::Error(v)
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(LogValue::Undefined)
    }
}

/// A structured value that is not a plain map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectValue {
    /// Own fields, copied one level deep.
    pub fields: PropertyBag,
    /// Text form, if the value has one.
    pub display: Option<String>,
}

impl ObjectValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any serializable value.
    ///
    /// Values that do not serialize to a map keep no fields.
    pub fn from_serialize<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        let fields = match serde_json::to_value(value)? {
            Value::Object(map) => map,
            _ => PropertyBag::new(),
        };
        Ok(Self {
            fields,
            display: None,
        })
    }

    /// Add a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set the text form.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

const RESERVED_ERROR_FIELDS: &[&str] = &["name", "message", "stack"];

/// Error payload forwarded as exception telemetry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorValue {
    /// Error type name, `"Error"` unless set.
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Stack or backtrace text. Never copied into property bags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Additional own fields set on the error.
    #[serde(flatten)]
    pub fields: PropertyBag,
}

impl ErrorValue {
    /// Create an error with the default name.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            stack: None,
            fields: PropertyBag::new(),
        }
    }

    /// Capture a Rust error. The source chain is kept as a `cause` field.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let type_name = std::any::type_name::<E>();
        let name = type_name
            .split('<')
            .next()
            .and_then(|path| path.rsplit("::").next())
            .filter(|name| !name.is_empty() && *name != "dyn")
            .unwrap_or("Error");

        let mut value = Self::new(err.to_string()).with_name(name);

        let causes: Vec<Value> = std::iter::successors(err.source(), |e| e.source())
            .map(|e| Value::String(e.to_string()))
            .collect();
        match causes.len() {
            0 => {}
            1 => {
                value.fields.insert("cause".to_string(), causes[0].clone());
            }
            _ => {
                value.fields.insert("cause".to_string(), Value::Array(causes));
            }
        }

        value
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Add an own field.
    ///
    /// `name`, `message` and `stack` are ignored here: they have their own
    /// slots and would otherwise serialize twice.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !RESERVED_ERROR_FIELDS.contains(&key.as_str()) {
            self.fields.insert(key, value.into());
        }
        self
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.name.is_empty(), self.message.is_empty()) {
            (_, true) => write!(f, "{}", self.name),
            (true, false) => write!(f, "{}", self.message),
            (false, false) => write!(f, "{}: {}", self.name, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk full")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "write failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_message_coercion() {
        assert_eq!(LogValue::Undefined.to_message_string(), "undefined");
        assert_eq!(LogValue::Value(Value::Null).to_message_string(), "null");
        assert_eq!(LogValue::from("hello").to_message_string(), "hello");
        assert_eq!(LogValue::from(42i64).to_message_string(), "42");
        assert_eq!(LogValue::from(true).to_message_string(), "true");
        assert_eq!(
            LogValue::Value(json!([1, null, "a"])).to_message_string(),
            "1,,a"
        );
        assert_eq!(
            LogValue::Value(json!({"a": 1})).to_message_string(),
            "[object Object]"
        );
    }

    #[test]
    fn test_object_coercion_uses_display() {
        let obj = ObjectValue::new()
            .with_field("value", "value")
            .with_display("Custom toString - value");
        assert_eq!(
            LogValue::from(obj).to_message_string(),
            "Custom toString - value"
        );

        let plain = ObjectValue::new().with_field("value", "value");
        assert_eq!(LogValue::from(plain).to_message_string(), "[object Object]");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ErrorValue::new("boom").to_string(), "Error: boom");
        assert_eq!(
            ErrorValue::new("boom").with_name("RangeError").to_string(),
            "RangeError: boom"
        );
        assert_eq!(ErrorValue::new("").to_string(), "Error");
        assert_eq!(ErrorValue::new("boom").with_name("").to_string(), "boom");
        assert_eq!(LogValue::from(ErrorValue::new("boom")).to_message_string(), "Error: boom");
    }

    #[test]
    fn test_error_ignores_stack_field() {
        let err = ErrorValue::new("boom")
            .with_field("stack", "at main")
            .with_field("code", 7);

        assert!(err.stack.is_none());
        assert_eq!(err.fields.get("code"), Some(&json!(7)));
        assert!(!err.fields.contains_key("stack"));
    }

    #[test]
    fn test_error_ignores_name_and_message_fields() {
        let err = ErrorValue::new("boom")
            .with_field("message", "shadow")
            .with_field("name", "Other")
            .with_field("code", 7);

        assert_eq!(err.name, "Error");
        assert_eq!(err.message, "boom");
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"name":"Error","message":"boom","code":7}"#
        );
    }

    #[test]
    fn test_error_from_std_error() {
        let err = ErrorValue::from_error(&Outer(Inner));

        assert_eq!(err.name, "Outer");
        assert_eq!(err.message, "write failed");
        assert_eq!(err.fields.get("cause"), Some(&json!("disk full")));
    }

    #[test]
    fn test_property_normalization() {
        assert_eq!(LogValue::Undefined.to_property_value(), None);
        assert_eq!(
            LogValue::from("x").to_property_value(),
            Some(json!("x"))
        );

        let obj = ObjectValue::new().with_field("value", "value").with_display("text");
        assert_eq!(
            LogValue::from(obj).to_property_value(),
            Some(json!({"value": "value"}))
        );

        let err = ErrorValue::new("boom").with_field("code", 7);
        assert_eq!(
            LogValue::from(err).to_property_value(),
            Some(json!({"code": 7}))
        );
    }

    #[test]
    fn test_own_fields() {
        assert!(LogValue::from("text").own_fields().is_empty());
        assert!(LogValue::Value(json!([1, 2])).own_fields().is_empty());
        assert_eq!(
            LogValue::Value(json!({"answer": 42})).own_fields().get("answer"),
            Some(&json!(42))
        );
    }

    #[test]
    fn test_object_from_serialize() {
        #[derive(Serialize)]
        struct Order {
            id: u32,
        }

        let obj = ObjectValue::from_serialize(&Order { id: 9 }).unwrap();
        assert_eq!(obj.fields.get("id"), Some(&json!(9)));

        let scalar = ObjectValue::from_serialize(&5).unwrap();
        assert!(scalar.fields.is_empty());
    }
}

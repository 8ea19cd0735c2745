//! Converters between JSON values and typed `Value`s.
//!
//! The set of adapter kinds is closed: four primitives, two containers, records and four
//! timestamp encodings. New kinds are added here, not registered at runtime; the registry only
//! decides which kind a `TypeSpec` maps to.
pub mod simple;
pub mod container;
pub mod timestamp;
pub mod record;

use serde_json::Value as Json;

use crate::error::{Error, ErrorKind, Result};
use crate::record::RecordType;
use crate::value::Value;

pub use timestamp::TimestampFormat;

/// Decode recursion cap. Type nesting is bounded by the schema, JSON nesting is not.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Adapter {
    Int,
    Float,
    Bool,
    Str,
    List(Box<Adapter>),
    Map(Box<Adapter>),
    Record(RecordType),
    Timestamp(TimestampFormat),
}

impl Adapter {
    pub fn list(child: Adapter) -> Self {
        Adapter::List(Box::new(child))
    }

    pub fn map(child: Adapter) -> Self {
        Adapter::Map(Box::new(child))
    }

    pub fn decode(&self, json: &Json) -> Result<Value> {
        self.decode_at(json, 0)
    }

    pub(crate) fn decode_at(&self, json: &Json, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(Error::new(ErrorKind::DepthExceeded(MAX_DEPTH)));
        }
        match self {
            Adapter::Int => simple::decode_int(json),
            Adapter::Float => simple::decode_float(json),
            Adapter::Bool => Ok(simple::decode_bool(json)),
            Adapter::Str => simple::decode_str(json),
            Adapter::List(child) => container::decode_list(child, json, depth),
            Adapter::Map(child) => container::decode_map(child, json, depth),
            Adapter::Record(rt) => record::decode(rt, json, depth),
            Adapter::Timestamp(format) => format.decode(json),
        }
    }

    pub fn encode(&self, value: &Value) -> Result<Json> {
        match self {
            Adapter::Int => simple::encode_int(value),
            Adapter::Float => simple::encode_float(value),
            Adapter::Bool => Ok(Json::Bool(value.is_truthy())),
            Adapter::Str => simple::encode_str(value),
            Adapter::List(child) => container::encode_list(child, value),
            Adapter::Map(child) => container::encode_map(child, value),
            Adapter::Record(rt) => record::encode(rt, value),
            Adapter::Timestamp(format) => format.encode(value),
        }
    }

    /// Value substituted for an absent field that declares no default.
    pub fn zero(&self) -> Value {
        match self {
            Adapter::Int => Value::Int(0),
            Adapter::Float => Value::Float(0.0),
            Adapter::Bool => Value::Bool(false),
            Adapter::Str => Value::Str(String::new()),
            Adapter::List(_) => Value::List(Vec::new()),
            Adapter::Map(_) => Value::Map(Default::default()),
            Adapter::Record(_) | Adapter::Timestamp(_) => Value::Null,
        }
    }

    pub fn is_empty(&self, value: &Value) -> bool {
        match self {
            Adapter::Record(_) | Adapter::Timestamp(_) => value.is_null(),
            _ => !value.is_truthy(),
        }
    }

    /// Turns a declared default into the field's zero. Timestamps always go through the
    /// auto-detecting path so `0`, `0.5` and `"2020-03-12T00:00:00"` are all accepted.
    pub fn coerce_default(&self, default: &Json) -> Result<Value> {
        match self {
            Adapter::Timestamp(_) => TimestampFormat::Auto.decode(default),
            _ => self.decode(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_values_per_kind() {
        assert_eq!(Adapter::Int.zero(), Value::Int(0));
        assert_eq!(Adapter::Str.zero(), Value::Str(String::new()));
        assert_eq!(Adapter::list(Adapter::Int).zero(), Value::List(vec![]));
        assert_eq!(Adapter::Timestamp(TimestampFormat::Auto).zero(), Value::Null);
    }

    #[test]
    fn emptiness() {
        assert!(Adapter::Str.is_empty(&Value::Str(String::new())));
        assert!(!Adapter::Str.is_empty(&Value::Str("x".into())));
        assert!(Adapter::list(Adapter::Int).is_empty(&Value::List(vec![])));
        assert!(Adapter::Int.is_empty(&Value::Int(0)));
        assert!(Adapter::Timestamp(TimestampFormat::Int).is_empty(&Value::Null));
    }

    #[test]
    fn default_timestamp_goes_through_auto() {
        let adapter = Adapter::Timestamp(TimestampFormat::Str);
        let zero = adapter.coerce_default(&json!(0)).unwrap();
        assert_eq!(zero, Value::Timestamp(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH));
    }

    #[test]
    fn deep_nesting_is_capped() {
        let mut adapter = Adapter::Int;
        let mut doc = json!(1);
        for _ in 0..(MAX_DEPTH + 2) {
            adapter = Adapter::list(adapter);
            doc = json!([doc]);
        }
        let err = adapter.decode(&doc).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DepthExceeded(_)));
    }
}

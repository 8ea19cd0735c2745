//! Typed in-memory values produced by decode and consumed by encode.
//!
//! Adapters are composed at runtime, so the value tree is dynamic. Records ride along as
//! boxed `DynRecord`s and are recovered with `FromValue`.
use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Record(RecordValue),
}

/// A boxed record instance.
pub struct RecordValue(Box<dyn DynRecord>);

/// Object-safe face of `Record`.
pub trait DynRecord: Any + Send + Sync {
    fn record_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_box(&self) -> Box<dyn DynRecord>;
    fn eq_dyn(&self, other: &dyn DynRecord) -> bool;
    fn debug_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<R: Record> DynRecord for R {
    fn record_name(&self) -> &'static str {
        R::NAME
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
    fn clone_box(&self) -> Box<dyn DynRecord> {
        Box::new(self.clone())
    }
    fn eq_dyn(&self, other: &dyn DynRecord) -> bool {
        other.as_any().downcast_ref::<R>() == Some(self)
    }
    fn debug_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl RecordValue {
    pub fn new<R: Record>(record: R) -> Self {
        RecordValue(Box::new(record))
    }

    pub fn name(&self) -> &'static str {
        self.0.record_name()
    }

    pub fn downcast_ref<R: Record>(&self) -> Option<&R> {
        self.0.as_any().downcast_ref::<R>()
    }

    /// On failure hands back the name of the record actually held.
    pub fn downcast<R: Record>(self) -> std::result::Result<R, &'static str> {
        let name = self.name();
        self.0.into_any().downcast::<R>().map(|r| *r).map_err(|_| name)
    }
}

impl Clone for RecordValue {
    fn clone(&self) -> Self {
        RecordValue(self.0.clone_box())
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

impl fmt::Debug for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.debug_dyn(f)
    }
}

impl Value {
    pub fn record<R: Record>(record: R) -> Self {
        Value::Record(RecordValue::new(record))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(r) => r.name(),
        }
    }

    /// Falsy values are the ones `omit_empty` drops.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Timestamp(_) => true,
            Value::List(xs) => !xs.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Record(_) => true,
        }
    }
}

pub(crate) fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSIONS
// ————————————————————————————————————————————————————————————————————————————

/// Typed extraction out of a decoded `Value`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

/// Typed insertion into a `Value` before encode.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(Error::mismatch("bool", other.kind_name())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(Error::mismatch("int", other.kind_name())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(Error::mismatch("float", other.kind_name())),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(Error::mismatch("str", other.kind_name())),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(Error::mismatch("timestamp", other.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(xs) => xs.into_iter().map(T::from_value).collect(),
            other => Err(Error::mismatch("list", other.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(m) => m
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(Error::mismatch("map", other.kind_name())),
        }
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for IndexMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

/// Backs `FromValue` for record types (see `record_value!`).
pub fn record_from_value<R: Record>(value: Value) -> Result<R> {
    match value {
        Value::Record(rv) => rv
            .downcast::<R>()
            .map_err(|actual| Error::mismatch(R::NAME, actual)),
        other => Err(Error::mismatch(R::NAME, other.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_empty_notion() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(!Value::Map(IndexMap::new()).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH).is_truthy());
    }

    #[test]
    fn typed_extraction() {
        let v = vec!["a", "b"].into_value();
        assert_eq!(Vec::<String>::from_value(v).unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(f64::from_value(Value::Int(3)).unwrap(), 3.0);

        let err = i64::from_value(Value::Str("3".into())).unwrap_err();
        assert_eq!(err.to_string(), "expected int, got str");
    }
}

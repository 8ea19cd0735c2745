//! Primitive adapters. These coerce permissively: numeric strings become numbers, scalars
//! become strings, anything becomes a bool by truthiness.
use serde_json::{Number, Value as Json};

use crate::error::{Error, Result};
use crate::value::{json_kind, Value};

pub(super) fn decode_int(json: &Json) -> Result<Value> {
    let out = match json {
        Json::Number(n) => number_to_i64(n),
        Json::Bool(b) => Some(i64::from(*b)),
        Json::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    out.map(Value::Int)
        .ok_or_else(|| Error::mismatch("int", json_kind(json)))
}

pub(super) fn encode_int(value: &Value) -> Result<Json> {
    let out = match value {
        Value::Int(i) => Some(*i),
        Value::Float(f) => f64_to_i64(*f),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Str(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    out.map(Json::from)
        .ok_or_else(|| Error::mismatch("int", value.kind_name()))
}

pub(super) fn decode_float(json: &Json) -> Result<Value> {
    let out = match json {
        Json::Number(n) => n.as_f64(),
        Json::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Json::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    out.map(Value::Float)
        .ok_or_else(|| Error::mismatch("float", json_kind(json)))
}

pub(super) fn encode_float(value: &Value) -> Result<Json> {
    let out = match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let f = out.ok_or_else(|| Error::mismatch("float", value.kind_name()))?;
    // non-finite floats have no JSON form
    Number::from_f64(f)
        .map(Json::Number)
        .ok_or_else(|| Error::mismatch("finite float", f.to_string()))
}

pub(super) fn decode_str(json: &Json) -> Result<Value> {
    match json {
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Number(n) => Ok(Value::Str(n.to_string())),
        Json::Bool(b) => Ok(Value::Str(b.to_string())),
        other => Err(Error::mismatch("str", json_kind(other))),
    }
}

pub(super) fn encode_str(value: &Value) -> Result<Json> {
    match value {
        Value::Str(s) => Ok(Json::String(s.clone())),
        Value::Int(i) => Ok(Json::String(i.to_string())),
        Value::Float(f) => Ok(Json::String(f.to_string())),
        Value::Bool(b) => Ok(Json::String(b.to_string())),
        other => Err(Error::mismatch("str", other.kind_name())),
    }
}

pub(super) fn decode_bool(json: &Json) -> Value {
    let b = match json {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(xs) => !xs.is_empty(),
        Json::Object(m) => !m.is_empty(),
    };
    Value::Bool(b)
}

fn number_to_i64(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().and_then(f64_to_i64))
}

fn f64_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::record::RecordType;
use crate::value::{json_kind, Value};

pub(super) fn decode(rt: &RecordType, json: &Json, depth: usize) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Object(obj) => rt.build(obj, depth + 1),
        other => Err(Error::mismatch("object", json_kind(other))),
    }
}

pub(super) fn encode(rt: &RecordType, value: &Value) -> Result<Json> {
    match value {
        Value::Null => Ok(Json::Null),
        other => rt.flatten(other).map(Json::Object),
    }
}

//! Entry points at the JSON boundary.
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::record::{build_record, flatten_record, schema_of, Record};
use crate::schema::FieldValues;
use crate::value::json_kind;

pub fn from_json<R: Record>(json: &Json) -> Result<R> {
    match json {
        Json::Object(obj) => build_record::<R>(obj, 0),
        other => Err(Error::mismatch("object", json_kind(other))),
    }
}

pub fn from_json_str<R: Record>(src: &str) -> Result<R> {
    let json: Json = serde_json::from_str(src)?;
    from_json(&json)
}

pub fn to_json<R: Record>(record: &R) -> Result<Json> {
    flatten_record(record).map(Json::Object)
}

pub fn to_json_str<R: Record>(record: &R) -> Result<String> {
    Ok(serde_json::to_string(&to_json(record)?)?)
}

pub fn to_json_str_pretty<R: Record>(record: &R) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(record)?)?)
}

/// An instance with every field at its zero value (declared default, or the adapter's zero).
pub fn zeroed<R: Record>() -> Result<R> {
    let schema = schema_of::<R>()?;
    let mut values = FieldValues::default();
    for binding in schema.fields() {
        values.put(binding.attr(), binding.zero().clone());
    }
    R::build(&mut values)
}

/// Method-call sugar over the free functions, available on every record.
pub trait Marshal: Record {
    fn from_json(json: &Json) -> Result<Self> {
        from_json(json)
    }

    fn from_json_str(src: &str) -> Result<Self> {
        from_json_str(src)
    }

    fn to_json(&self) -> Result<Json> {
        to_json(self)
    }

    fn to_json_str(&self) -> Result<String> {
        to_json_str(self)
    }

    fn zeroed() -> Result<Self> {
        zeroed()
    }
}

impl<R: Record> Marshal for R {}

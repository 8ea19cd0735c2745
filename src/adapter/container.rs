use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use super::Adapter;
use crate::error::{Error, PathSegment, Result};
use crate::value::{json_kind, Value};

pub(super) fn decode_list(child: &Adapter, json: &Json, depth: usize) -> Result<Value> {
    let Json::Array(items) = json else {
        return Err(Error::mismatch("list", json_kind(json)));
    };
    items
        .iter()
        .enumerate()
        .map(|(ix, item)| {
            child
                .decode_at(item, depth + 1)
                .map_err(|e| e.at(PathSegment::Index(ix)))
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::List)
}

pub(super) fn encode_list(child: &Adapter, value: &Value) -> Result<Json> {
    let Value::List(items) = value else {
        return Err(Error::mismatch("list", value.kind_name()));
    };
    items
        .iter()
        .enumerate()
        .map(|(ix, item)| child.encode(item).map_err(|e| e.at(PathSegment::Index(ix))))
        .collect::<Result<Vec<_>>>()
        .map(Json::Array)
}

pub(super) fn decode_map(child: &Adapter, json: &Json, depth: usize) -> Result<Value> {
    let Json::Object(entries) = json else {
        return Err(Error::mismatch("map", json_kind(json)));
    };
    let mut out = IndexMap::with_capacity(entries.len());
    for (key, item) in entries {
        let v = child
            .decode_at(item, depth + 1)
            .map_err(|e| e.at(PathSegment::Key(key.clone())))?;
        out.insert(key.clone(), v);
    }
    Ok(Value::Map(out))
}

pub(super) fn encode_map(child: &Adapter, value: &Value) -> Result<Json> {
    let Value::Map(entries) = value else {
        return Err(Error::mismatch("map", value.kind_name()));
    };
    let mut out = Map::new();
    for (key, item) in entries {
        let j = child
            .encode(item)
            .map_err(|e| e.at(PathSegment::Key(key.clone())))?;
        out.insert(key.clone(), j);
    }
    Ok(Json::Object(out))
}

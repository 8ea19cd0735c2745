//! The record capability.
//!
//! A record type opts in by implementing [`Record`]: it declares its fields once, and moves
//! field values in and out of a [`FieldValues`] bag. Everything else (binding fields to
//! adapters, reading and writing JSON objects, caching the binding table) happens here.
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::registry;
use crate::schema::{FieldValues, Schema, SchemaBuilder};
use crate::value::Value;

pub type JsonObject = Map<String, Json>;

pub trait Record: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;

    /// Declare fields, in wire order. Called once per process.
    fn declare(schema: &mut SchemaBuilder<'_>) -> Result<()>;

    /// Assemble an instance from decoded field values, keyed by attribute name.
    fn build(values: &mut FieldValues) -> Result<Self>;

    /// Hand every field value out, keyed by attribute name.
    fn flatten(&self, values: &mut FieldValues);
}

/// Type-erased handle on a `Record` implementation. Equality is type identity.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    type_id: TypeId,
    build: fn(&JsonObject, usize) -> Result<Value>,
    flatten: fn(&Value) -> Result<JsonObject>,
}

impl RecordType {
    pub fn of<R: Record>() -> Self {
        Self {
            name: R::NAME,
            type_id: TypeId::of::<R>(),
            build: build_value::<R>,
            flatten: flatten_value::<R>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build(&self, obj: &JsonObject, depth: usize) -> Result<Value> {
        (self.build)(obj, depth)
    }

    pub(crate) fn flatten(&self, value: &Value) -> Result<JsonObject> {
        (self.flatten)(value)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA CACHE
// ————————————————————————————————————————————————————————————————————————————

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, Arc<Schema>>>> = Lazy::new(Default::default);

thread_local! {
    /// Record types whose `declare` is running on this thread.
    static DECLARING: RefCell<HashSet<TypeId>> = RefCell::new(HashSet::new());
}

/// Marks a record type as being declared until dropped.
struct DeclareGuard(TypeId);

impl DeclareGuard {
    fn enter<R: Record>() -> Result<Self> {
        let id = TypeId::of::<R>();
        if DECLARING.with(|set| set.borrow_mut().insert(id)) {
            Ok(DeclareGuard(id))
        } else {
            Err(Error::new(ErrorKind::RecursiveSchema(R::NAME)))
        }
    }
}

impl Drop for DeclareGuard {
    fn drop(&mut self) {
        DECLARING.with(|set| set.borrow_mut().remove(&self.0));
    }
}

/// Binding table of `R`, resolved against the global registry on first use.
pub fn schema_of<R: Record>() -> Result<Arc<Schema>> {
    let id = TypeId::of::<R>();
    if let Some(schema) = SCHEMAS.read().unwrap_or_else(PoisonError::into_inner).get(&id) {
        return Ok(schema.clone());
    }
    // built outside the lock: declaring a field may decode a default of another record type;
    // a default or base that leads back to `R` fails with `RecursiveSchema`
    let guard = DeclareGuard::enter::<R>()?;
    let mut builder = SchemaBuilder::new(R::NAME, registry::global());
    R::declare(&mut builder)?;
    drop(guard);
    let schema = Arc::new(builder.finish());
    debug!(record = R::NAME, fields = schema.len(), "schema built");

    let mut schemas = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    Ok(schemas.entry(id).or_insert(schema).clone())
}

pub(crate) fn build_record<R: Record>(obj: &JsonObject, depth: usize) -> Result<R> {
    let schema = schema_of::<R>()?;
    let mut values = FieldValues::default();
    for binding in schema.fields() {
        let value = binding
            .read(obj, depth)
            .map_err(|e| e.at_field(binding.name()))?;
        values.put(binding.attr(), value);
    }
    R::build(&mut values)
}

pub(crate) fn flatten_record<R: Record>(record: &R) -> Result<JsonObject> {
    let schema = schema_of::<R>()?;
    let mut values = FieldValues::default();
    record.flatten(&mut values);

    let mut out = JsonObject::new();
    for binding in schema.fields() {
        let value = values
            .remove(binding.attr())
            .unwrap_or_else(|| binding.zero().clone());
        binding
            .write(&mut out, &value)
            .map_err(|e| e.at_field(binding.name()))?;
    }
    if let Some(attr) = values.attrs().next() {
        return Err(Error::new(ErrorKind::UndeclaredField(attr.to_owned())));
    }
    Ok(out)
}

fn build_value<R: Record>(obj: &JsonObject, depth: usize) -> Result<Value> {
    build_record::<R>(obj, depth).map(Value::record)
}

fn flatten_value<R: Record>(value: &Value) -> Result<JsonObject> {
    match value {
        Value::Record(rv) => match rv.downcast_ref::<R>() {
            Some(record) => flatten_record(record),
            None => Err(Error::mismatch(R::NAME, rv.name())),
        },
        other => Err(Error::mismatch(R::NAME, other.kind_name())),
    }
}

/// Implements `FromValue`/`IntoValue` for record types so they can sit inside other records,
/// lists and maps.
#[macro_export]
macro_rules! record_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FromValue for $ty {
            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::value::record_from_value(value)
            }
        }
        impl $crate::IntoValue for $ty {
            fn into_value(self) -> $crate::Value {
                $crate::Value::record(self)
            }
        }
    )+};
}

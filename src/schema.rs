//! Field declarations and the per-record binding table.
//!
//! A [`Field`] is what a record declares; a [`FieldBinding`] is that declaration after its type
//! has been resolved into an adapter and its default coerced into a zero value. A [`Schema`] is
//! the frozen, ordered table of bindings for one record type.
use indexmap::IndexMap;
use serde_json::Value as Json;
use tracing::{trace, warn};

use crate::adapter::Adapter;
use crate::error::{Error, ErrorKind, Result};
use crate::record::{schema_of, JsonObject, Record};
use crate::registry::TypeRegistry;
use crate::typespec::TypeRef;
use crate::value::{FromValue, IntoValue, Value};

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Field {
    ty: TypeRef,
    name: Option<String>,
    required: bool,
    omit_empty: bool,
    allow_null: bool,
    default: Option<Json>,
}

impl Field {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            name: None,
            required: false,
            omit_empty: true,
            allow_null: false,
            default: None,
        }
    }

    pub fn record<R: Record>() -> Self {
        Self::new(TypeRef::record::<R>())
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Always write the field, even when it holds its empty value.
    pub fn keep_empty(mut self) -> Self {
        self.omit_empty = false;
        self
    }

    /// Treat an explicit JSON `null` as absent.
    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Wire name, when it differs from the attribute name.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn default(mut self, value: impl Into<Json>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

// ————————————————————————————————————————————————————————————————————————————
// BINDING
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct FieldBinding {
    attr: String,
    name: String,
    adapter: Adapter,
    zero: Value,
    required: bool,
    omit_empty: bool,
    allow_null: bool,
}

impl FieldBinding {
    pub fn bind(attr: &str, field: &Field, registry: &TypeRegistry) -> Result<Self> {
        let adapter = registry.resolve(&field.ty)?;
        let zero = match &field.default {
            Some(default) => adapter.coerce_default(default)?,
            None => adapter.zero(),
        };
        Ok(Self {
            attr: attr.to_owned(),
            name: field.name.clone().unwrap_or_else(|| attr.to_owned()),
            adapter,
            zero,
            required: field.required,
            omit_empty: field.omit_empty,
            allow_null: field.allow_null,
        })
    }

    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Key used in JSON objects.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn zero(&self) -> &Value {
        &self.zero
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn read(&self, obj: &JsonObject, depth: usize) -> Result<Value> {
        match obj.get(&self.name) {
            None if self.required => Err(Error::new(ErrorKind::RequiredFieldMissing(self.name.clone()))),
            None => Ok(self.zero.clone()),
            Some(Json::Null) if self.allow_null => Ok(self.zero.clone()),
            Some(json) => self.adapter.decode_at(json, depth),
        }
    }

    pub fn write(&self, out: &mut JsonObject, value: &Value) -> Result<()> {
        if self.omit_empty && self.adapter.is_empty(value) {
            return Ok(());
        }
        out.insert(self.name.clone(), self.adapter.encode(value)?);
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TABLE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Schema {
    record: &'static str,
    fields: IndexMap<String, FieldBinding>,
}

impl Schema {
    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldBinding> {
        self.fields.values()
    }

    pub fn field(&self, attr: &str) -> Option<&FieldBinding> {
        self.fields.get(attr)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Append-only builder. A derived record starts from its base's table with
/// [`SchemaBuilder::extend`]; the base's own table is never touched.
pub struct SchemaBuilder<'r> {
    registry: &'r TypeRegistry,
    record: &'static str,
    fields: IndexMap<String, FieldBinding>,
}

impl<'r> SchemaBuilder<'r> {
    pub fn new(record: &'static str, registry: &'r TypeRegistry) -> Self {
        Self { registry, record, fields: IndexMap::new() }
    }

    pub fn field(&mut self, attr: &str, field: Field) -> Result<&mut Self> {
        let binding = FieldBinding::bind(attr, &field, self.registry).map_err(|e| e.at_field(attr))?;
        trace!(record = self.record, attr, ty = %field.ty, "field bound");
        self.insert(binding);
        Ok(self)
    }

    /// Copy every field of `B`. Fields declared afterwards with the same attribute replace the
    /// inherited ones in place.
    pub fn extend<B: Record>(&mut self) -> Result<&mut Self> {
        let base = schema_of::<B>()?;
        for binding in base.fields() {
            self.insert(binding.clone());
        }
        Ok(self)
    }

    fn insert(&mut self, binding: FieldBinding) {
        if self.fields.contains_key(&binding.attr) {
            warn!(record = self.record, attr = %binding.attr, "field redeclared, replacing");
        }
        self.fields.insert(binding.attr.clone(), binding);
    }

    pub fn finish(self) -> Schema {
        Schema { record: self.record, fields: self.fields }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALUES
// ————————————————————————————————————————————————————————————————————————————

/// Field values keyed by attribute name, passed between a record and its schema.
#[derive(Debug, Clone, Default)]
pub struct FieldValues(IndexMap<String, Value>);

impl FieldValues {
    pub fn put(&mut self, attr: &str, value: impl IntoValue) {
        self.0.insert(attr.to_owned(), value.into_value());
    }

    /// Remove a value and convert it to the attribute's Rust type.
    pub fn take<T: FromValue>(&mut self, attr: &str) -> Result<T> {
        let value = self
            .0
            .shift_remove(attr)
            .ok_or_else(|| Error::new(ErrorKind::UndeclaredField(attr.to_owned())))?;
        T::from_value(value).map_err(|e| e.at_field(attr))
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.0.get(attr)
    }

    pub(crate) fn remove(&mut self, attr: &str) -> Option<Value> {
        self.0.shift_remove(attr)
    }

    pub fn attrs(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

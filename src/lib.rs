//! Schema-driven conversion between JSON values and typed records.
//!
//! Fields are declared with a [`TypeSpec`] (or a primitive, or another record). Each declared
//! type is resolved once, through a [`TypeRegistry`], into a composed [`Adapter`]; the
//! resulting per-record [`Schema`] drives every decode and encode of that record.
//!
//! ```ignore
//! impl Record for Person {
//!     const NAME: &'static str = "Person";
//!     fn declare(s: &mut SchemaBuilder<'_>) -> Result<()> {
//!         s.field("name", Field::new(Primitive::Str).required())?
//!          .field("hobbies", Field::new(list_of(Primitive::Str)))?;
//!         Ok(())
//!     }
//!     // build / flatten move values in and out of `FieldValues`
//! }
//! let p: Person = from_json_str(r#"{"name": "John"}"#)?;
//! ```
pub mod adapter;
pub mod error;
pub mod marshal;
pub mod record;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod typespec;
pub mod value;

pub use adapter::{Adapter, TimestampFormat};
pub use error::{Error, ErrorKind, PathSegment, Result};
pub use marshal::{from_json, from_json_str, to_json, to_json_str, to_json_str_pretty, zeroed, Marshal};
pub use record::{schema_of, Record, RecordType};
pub use registry::{Factory, TypeRegistry};
pub use schema::{Field, FieldBinding, FieldValues, Schema, SchemaBuilder};
pub use typespec::{
    list_of, map_of, timestamp, Primitive, Tag, TypeArg, TypeRef, TypeSpec, LIST_OF, MAP_OF,
    TIMESTAMP,
};
pub use value::{FromValue, IntoValue, RecordValue, Value};

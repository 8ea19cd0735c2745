//! Type resolution: turn a `TypeRef` into a composed adapter.
//!
//! 1. records go straight to the registry's record handler
//! 2. otherwise look up a factory (exact, then wildcard by head)
//! 3. container factories get their argument resolved first, recursively
//! 4. leaf factories get the raw argument (or none)
//!
//! Resolution is pure. Depth is bounded by how deeply the declaring code nests its types.
use tracing::debug;

use crate::adapter::Adapter;
use crate::error::{Error, Result};
use crate::registry::{Factory, TypeRegistry};
use crate::typespec::{TypeArg, TypeRef};

impl TypeRegistry {
    pub fn resolve(&self, ty: &TypeRef) -> Result<Adapter> {
        if let TypeRef::Record(rt) = ty {
            return Ok((self.record_handler())(*rt));
        }
        let arg = match ty {
            TypeRef::Spec(spec) => spec.arg(),
            _ => None,
        };
        let adapter = match self.lookup(ty)? {
            Factory::Container(build) => match arg {
                Some(TypeArg::Type(inner)) => build(self.resolve(inner)?),
                _ => return Err(Error::missing_type_argument(ty)),
            },
            Factory::Leaf(build) => build(arg)?,
        };
        debug!(%ty, ?adapter, "resolved");
        Ok(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::TimestampFormat;
    use crate::error::ErrorKind;
    use crate::record::{Record, RecordType};
    use crate::registry::Factory;
    use crate::schema::{FieldValues, SchemaBuilder};
    use crate::typespec::{list_of, map_of, timestamp, Primitive, Tag, TypeSpec, LIST_OF, MAP_OF};
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn wildcard_priority() {
        let mut reg = TypeRegistry::default();
        // exact map<bool> coerces values to strings instead
        reg.register(map_of(Primitive::Bool), Factory::constant(Adapter::map(Adapter::Str)));

        let exact = reg.resolve(&map_of(Primitive::Bool).into()).unwrap();
        assert_eq!(exact, Adapter::map(Adapter::Str));

        let fallback = reg.resolve(&map_of(Primitive::Int).into()).unwrap();
        assert_eq!(fallback, Adapter::map(Adapter::Int));
    }

    #[test]
    fn nested_containers_compose() {
        let reg = TypeRegistry::default();
        let adapter = reg.resolve(&list_of(map_of(Primitive::Str)).into()).unwrap();
        assert_eq!(adapter, Adapter::list(Adapter::map(Adapter::Str)));

        let doc = json!([{"a": "x"}, {"b": "y"}]);
        let value = adapter.decode(&doc).unwrap();
        let expected = Value::List(vec![
            Value::Map([("a".to_string(), Value::Str("x".into()))].into_iter().collect()),
            Value::Map([("b".to_string(), Value::Str("y".into()))].into_iter().collect()),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn unknown_head_fails_fast() {
        let reg = TypeRegistry::default();
        let set_of = TypeSpec::bare(Tag::new("set")).with_arg(Primitive::Int);
        let err = reg.resolve(&set_of.into()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownType(t) if t == "set<int>"));

        // the failure deep inside a container surfaces unchanged
        let nested = list_of(TypeSpec::bare(Tag::new("set")).with_arg(Primitive::Int));
        let err = reg.resolve(&nested.into()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownType(_)));
    }

    #[test]
    fn containers_need_an_argument() {
        let reg = TypeRegistry::default();
        // bare `list` has no exact entry, so it reaches the wildcard factory without an argument
        let err = reg.resolve(&LIST_OF.into()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingTypeArgument(t) if t == "list"));
        // a wildcard is a registration key, not something to resolve
        let err = reg.resolve(&MAP_OF.any().into()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingTypeArgument(_)));
    }

    #[test]
    fn timestamp_variants() {
        let reg = TypeRegistry::default();
        let ts = |p| reg.resolve(&timestamp(p).into());
        assert_eq!(ts(None).unwrap(), Adapter::Timestamp(TimestampFormat::Auto));
        assert_eq!(ts(Some(Primitive::Int)).unwrap(), Adapter::Timestamp(TimestampFormat::Int));
        assert_eq!(ts(Some(Primitive::Float)).unwrap(), Adapter::Timestamp(TimestampFormat::Float));
        assert_eq!(ts(Some(Primitive::Str)).unwrap(), Adapter::Timestamp(TimestampFormat::Str));
        let err = ts(Some(Primitive::Bool)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidTimestampArgument(_)));

        let dt = reg.resolve(&Primitive::DateTime.into()).unwrap();
        assert_eq!(dt, Adapter::Timestamp(TimestampFormat::Auto));
    }

    #[test]
    fn resolution_is_idempotent() {
        let reg = TypeRegistry::default();
        let ty: TypeRef = map_of(list_of(timestamp(Some(Primitive::Float)))).into();
        assert_eq!(reg.resolve(&ty).unwrap(), reg.resolve(&ty).unwrap());
    }

    #[test]
    fn custom_heads_map_onto_existing_kinds() {
        let mut reg = TypeRegistry::default();
        let tags = TypeSpec::bare(Tag::new_static("tags"));
        reg.register(tags.clone(), Factory::constant(Adapter::list(Adapter::Str)));
        // a custom container head: `set<T>` stored as a list
        reg.register(TypeSpec::bare(Tag::new("set")).any(), Factory::container(Adapter::list));

        assert_eq!(reg.resolve(&tags.into()).unwrap(), Adapter::list(Adapter::Str));
        let set_of = TypeSpec::bare(Tag::new("set")).with_arg(Primitive::Float);
        assert_eq!(reg.resolve(&set_of.into()).unwrap(), Adapter::list(Adapter::Float));
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Pin;

    impl Record for Pin {
        const NAME: &'static str = "Pin";

        fn declare(_: &mut SchemaBuilder<'_>) -> Result<()> {
            Ok(())
        }

        fn build(_: &mut FieldValues) -> Result<Self> {
            Ok(Pin)
        }

        fn flatten(&self, _: &mut FieldValues) {}
    }

    fn record_as_string_map(_: RecordType) -> Adapter {
        Adapter::map(Adapter::Str)
    }

    #[test]
    fn records_always_go_through_the_handler() {
        let pin = RecordType::of::<Pin>();

        let reg = TypeRegistry::default();
        assert_eq!(reg.resolve(&pin.into()).unwrap(), Adapter::Record(pin));

        let mut reg = TypeRegistry::default();
        reg.register_record_handler(record_as_string_map)
            // records never consult the tables, even an exact entry for the same type
            .register(pin, Factory::constant(Adapter::Int));

        assert_eq!(reg.resolve(&pin.into()).unwrap(), Adapter::map(Adapter::Str));
        assert_eq!(
            reg.resolve(&list_of(pin).into()).unwrap(),
            Adapter::list(Adapter::map(Adapter::Str))
        );

        // an empty registry still resolves records
        let reg = TypeRegistry::empty();
        assert_eq!(reg.resolve(&TypeRef::record::<Pin>()).unwrap(), Adapter::Record(pin));
    }
}

//! Declarative type descriptors.
//!
//! A `TypeSpec` is a head tag plus at most one argument: `list<int>`, `map<list<str>>`,
//! `timestamp<float>`. The argument `*` (`TypeArg::Wildcard`) is only meaningful as a
//! registration key: `map<*>` answers for every `map<T>` that has no exact entry.
use std::borrow::Cow;
use std::fmt;

use crate::record::{Record, RecordType};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Head of a parametrized type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    pub const LIST: Tag = Tag(Cow::Borrowed("list"));
    pub const MAP: Tag = Tag(Cow::Borrowed("map"));
    pub const TIMESTAMP: Tag = Tag(Cow::Borrowed("timestamp"));

    pub const fn new_static(name: &'static str) -> Self {
        Tag(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Tag(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Scalar types usable both as registry keys and as type arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Int,
    Float,
    Bool,
    Str,
    DateTime,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Str => "str",
            Primitive::DateTime => "datetime",
        }
    }
}

/// Anything the resolver can turn into an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(Primitive),
    Spec(TypeSpec),
    Record(RecordType),
}

/// The argument slot of a `TypeSpec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArg {
    Type(TypeRef),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    head: Tag,
    arg: Option<Box<TypeArg>>,
}

pub const LIST_OF: TypeSpec = TypeSpec::bare(Tag::LIST);
pub const MAP_OF: TypeSpec = TypeSpec::bare(Tag::MAP);
pub const TIMESTAMP: TypeSpec = TypeSpec::bare(Tag::TIMESTAMP);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TypeSpec {
    pub const fn bare(head: Tag) -> Self {
        Self { head, arg: None }
    }

    pub fn new(head: Tag, arg: Option<TypeArg>) -> Self {
        Self { head, arg: arg.map(Box::new) }
    }

    pub fn head(&self) -> &Tag {
        &self.head
    }

    pub fn arg(&self) -> Option<&TypeArg> {
        self.arg.as_deref()
    }

    /// Same head, new argument. `LIST_OF.with_arg(Primitive::Int)` is `list<int>`.
    pub fn with_arg(&self, arg: impl Into<TypeArg>) -> Self {
        Self { head: self.head.clone(), arg: Some(Box::new(arg.into())) }
    }

    /// `head<*>`
    pub fn any(&self) -> Self {
        self.with_arg(TypeArg::Wildcard)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.arg(), Some(TypeArg::Wildcard))
    }

    /// Registry-query semantics: `self` is the registered side. A wildcard on `self` accepts
    /// any argument of the same head; a wildcard on `other` only matches another wildcard.
    pub fn matches(&self, other: &TypeSpec) -> bool {
        if self == other {
            return true;
        }
        self.is_wildcard() && self.head == other.head
    }
}

pub fn list_of(item: impl Into<TypeArg>) -> TypeSpec {
    LIST_OF.with_arg(item)
}

pub fn map_of(value: impl Into<TypeArg>) -> TypeSpec {
    MAP_OF.with_arg(value)
}

pub fn timestamp(encoding: Option<Primitive>) -> TypeSpec {
    match encoding {
        None => TIMESTAMP,
        Some(p) => TIMESTAMP.with_arg(p),
    }
}

impl TypeRef {
    pub fn record<R: Record>() -> Self {
        TypeRef::Record(RecordType::of::<R>())
    }

    pub fn is_record(&self) -> bool {
        matches!(self, TypeRef::Record(_))
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        TypeRef::Primitive(p)
    }
}

impl From<TypeSpec> for TypeRef {
    fn from(spec: TypeSpec) -> Self {
        TypeRef::Spec(spec)
    }
}

impl From<RecordType> for TypeRef {
    fn from(rt: RecordType) -> Self {
        TypeRef::Record(rt)
    }
}

impl From<TypeRef> for TypeArg {
    fn from(t: TypeRef) -> Self {
        TypeArg::Type(t)
    }
}

impl From<Primitive> for TypeArg {
    fn from(p: Primitive) -> Self {
        TypeArg::Type(p.into())
    }
}

impl From<TypeSpec> for TypeArg {
    fn from(spec: TypeSpec) -> Self {
        TypeArg::Type(spec.into())
    }
}

impl From<RecordType> for TypeArg {
    fn from(rt: RecordType) -> Self {
        TypeArg::Type(rt.into())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{p}"),
            TypeRef::Spec(spec) => write!(f, "{spec}"),
            TypeRef::Record(rt) => f.write_str(rt.name()),
        }
    }
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArg::Type(t) => write!(f, "{t}"),
            TypeArg::Wildcard => f.write_str("*"),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg() {
            None => write!(f, "{}", self.head),
            Some(arg) => write!(f, "{}<{arg}>", self.head),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(TypeSpec::bare(Tag::new("float")), TypeSpec::bare(Tag::new("float")));
        assert_ne!(TypeSpec::bare(Tag::new("float")), TypeSpec::bare(Tag::new("int")));

        let a = list_of(map_of(Primitive::Str));
        let b = list_of(map_of(Primitive::Str));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        // borrowed and owned heads compare by text
        assert_eq!(list_of(Primitive::Int), TypeSpec::bare(Tag::new("list")).with_arg(Primitive::Int));
    }

    #[test]
    fn with_arg_keeps_head() {
        let spec = LIST_OF.with_arg(Primitive::Int);
        assert_eq!(spec.head(), &Tag::LIST);
        assert_eq!(spec.arg(), Some(&TypeArg::from(Primitive::Int)));
        assert_eq!(LIST_OF.arg(), None);
    }

    #[test]
    fn wildcard_matching_is_asymmetric() {
        let ints = list_of(Primitive::Int);
        let strs = list_of(Primitive::Str);
        let any = LIST_OF.any();

        assert!(ints.matches(&ints.clone()));
        assert!(!ints.matches(&strs));
        assert!(any.matches(&ints));
        assert!(any.matches(&strs));
        assert!(any.matches(&any));
        // the query side never gets wildcard treatment
        assert!(!ints.matches(&any));
        assert!(!MAP_OF.any().matches(&ints));
    }

    #[test]
    fn display_renders_nested_arguments() {
        assert_eq!(list_of(map_of(Primitive::Str)).to_string(), "list<map<str>>");
        assert_eq!(MAP_OF.any().to_string(), "map<*>");
        assert_eq!(TIMESTAMP.to_string(), "timestamp");
        assert_eq!(timestamp(Some(Primitive::Int)).to_string(), "timestamp<int>");
    }
}

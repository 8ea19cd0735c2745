//! Type → adapter factory lookup.
//!
//! Two tables: `exact`, keyed by a primitive or a fully specified `TypeSpec`, and `wildcard`,
//! keyed by head only (populated by registering `head<*>`). Exact entries win. Record types
//! never hit either table; they go to the record handler.
//!
//! The process-wide registry follows init-then-freeze: [`install`] once during startup (or let
//! [`global`] install the defaults), then read it from anywhere without locking.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::adapter::{Adapter, TimestampFormat};
use crate::error::{Error, Result};
use crate::record::RecordType;
use crate::typespec::{Primitive, Tag, TypeArg, TypeRef, LIST_OF, MAP_OF, TIMESTAMP};

type LeafFn = dyn Fn(Option<&TypeArg>) -> Result<Adapter> + Send + Sync;
type ContainerFn = dyn Fn(Adapter) -> Adapter + Send + Sync;

/// How to build an adapter for a registered type.
#[derive(Clone)]
pub enum Factory {
    /// Receives the raw type argument, if any (e.g. the encoding of `timestamp<int>`).
    Leaf(Arc<LeafFn>),
    /// Receives the adapter already resolved from the type argument (`list<T>`, `map<T>`).
    Container(Arc<ContainerFn>),
}

impl Factory {
    pub fn leaf(f: impl Fn(Option<&TypeArg>) -> Result<Adapter> + Send + Sync + 'static) -> Self {
        Factory::Leaf(Arc::new(f))
    }

    pub fn container(f: impl Fn(Adapter) -> Adapter + Send + Sync + 'static) -> Self {
        Factory::Container(Arc::new(f))
    }

    /// Always yields `adapter`, ignoring any argument.
    pub fn constant(adapter: Adapter) -> Self {
        Self::leaf(move |_| Ok(adapter.clone()))
    }

    pub fn needs_param_parsing(&self) -> bool {
        matches!(self, Factory::Container(_))
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Leaf(_) => f.write_str("Factory::Leaf"),
            Factory::Container(_) => f.write_str("Factory::Container"),
        }
    }
}

pub type RecordHandler = fn(RecordType) -> Adapter;

#[derive(Clone)]
pub struct TypeRegistry {
    exact: HashMap<TypeRef, Factory>,
    wildcard: HashMap<Tag, Factory>,
    record_handler: RecordHandler,
}

impl TypeRegistry {
    /// No factories; records still resolve.
    pub fn empty() -> Self {
        Self {
            exact: HashMap::new(),
            wildcard: HashMap::new(),
            record_handler: Adapter::Record,
        }
    }

    pub fn register(&mut self, key: impl Into<TypeRef>, factory: Factory) -> &mut Self {
        let key = key.into();
        trace!(%key, ?factory, "register");
        match key {
            TypeRef::Spec(spec) if spec.is_wildcard() => {
                self.wildcard.insert(spec.head().clone(), factory);
            }
            key => {
                self.exact.insert(key, factory);
            }
        }
        self
    }

    pub fn register_record_handler(&mut self, handler: RecordHandler) -> &mut Self {
        self.record_handler = handler;
        self
    }

    pub fn record_handler(&self) -> RecordHandler {
        self.record_handler
    }

    /// Exact entry first, then the wildcard entry for the head.
    pub fn lookup(&self, key: &TypeRef) -> Result<&Factory> {
        if let Some(factory) = self.exact.get(key) {
            return Ok(factory);
        }
        if let TypeRef::Spec(spec) = key {
            if let Some(factory) = self.wildcard.get(spec.head()) {
                return Ok(factory);
            }
        }
        Err(Error::unknown_type(key))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let timestamp = Factory::leaf(|arg| TimestampFormat::from_arg(arg).map(Adapter::Timestamp));

        let mut reg = Self::empty();
        reg.register(Primitive::Str, Factory::constant(Adapter::Str))
            .register(Primitive::Int, Factory::constant(Adapter::Int))
            .register(Primitive::Bool, Factory::constant(Adapter::Bool))
            .register(Primitive::Float, Factory::constant(Adapter::Float))
            .register(
                Primitive::DateTime,
                Factory::constant(Adapter::Timestamp(TimestampFormat::Auto)),
            )
            .register(MAP_OF.any(), Factory::container(Adapter::map))
            .register(LIST_OF.any(), Factory::container(Adapter::list))
            .register(TIMESTAMP, timestamp.clone())
            .register(TIMESTAMP.any(), timestamp);
        reg
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("exact", &self.exact.keys().collect::<Vec<_>>())
            .field("wildcard", &self.wildcard.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PROCESS-WIDE REGISTRY
// ————————————————————————————————————————————————————————————————————————————

static GLOBAL: OnceCell<TypeRegistry> = OnceCell::new();

/// Freeze `registry` as the process-wide one. Hands it back if a registry is already frozen,
/// including when [`global`] already installed the defaults.
pub fn install(registry: TypeRegistry) -> std::result::Result<(), TypeRegistry> {
    GLOBAL.set(registry)
}

pub fn global() -> &'static TypeRegistry {
    GLOBAL.get_or_init(TypeRegistry::default)
}

#![deny(missing_docs)]

//! # Type Catalog
//!
//! Arena of every type known to one source, addressed by identifier.
//!
//! Each catalog is seeded with the unknown sentinel (handle 0) and the OpenAPI primitive
//! kinds. Lookups never fail: anything that is not declared resolves to the sentinel.

use crate::oas::models::{SchemaDecl, SchemaRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Identifier (and name) of the unknown sentinel.
pub const UNKNOWN_TYPE_ID: &str = "unknown";

/// Handle of a type inside the catalog that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(usize);

impl TypeHandle {
    /// The unknown sentinel, present in every catalog.
    pub const UNKNOWN: TypeHandle = TypeHandle(0);

    /// Position of the type in its catalog.
    pub fn index(self) -> usize {
        self.0
    }

    /// True for the unknown sentinel.
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

/// Primitive or composite kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `file` (Swagger 2.0)
    File,
    /// Not resolvable.
    Unknown,
}

impl TypeKind {
    /// Kinds seeded as builtin types in every catalog.
    pub const BUILTINS: [TypeKind; 7] = [
        TypeKind::String,
        TypeKind::Integer,
        TypeKind::Number,
        TypeKind::Boolean,
        TypeKind::Array,
        TypeKind::Object,
        TypeKind::File,
    ];

    /// Maps an OpenAPI `type` name (case-insensitive) to a kind.
    pub fn from_type_name(name: &str) -> Option<TypeKind> {
        Self::BUILTINS
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
    }

    /// The OpenAPI spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Integer => "integer",
            TypeKind::Number => "number",
            TypeKind::Boolean => "boolean",
            TypeKind::Array => "array",
            TypeKind::Object => "object",
            TypeKind::File => "file",
            TypeKind::Unknown => UNKNOWN_TYPE_ID,
        }
    }
}

/// A named slot of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    schema: SchemaRef,
    ty: Option<TypeHandle>,
}

impl Property {
    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared (unresolved) type position.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Resolved type; the sentinel until resolution has run.
    pub fn ty(&self) -> TypeHandle {
        self.ty.unwrap_or(TypeHandle::UNKNOWN)
    }

    /// Whether resolution has attached a type.
    pub fn is_resolved(&self) -> bool {
        self.ty.is_some()
    }
}

/// One type of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRecord {
    id: String,
    name: String,
    kind: TypeKind,
    builtin: bool,
    properties: Vec<Property>,
}

impl TypeRecord {
    /// Stable identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the type.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Seeded primitive or sentinel, as opposed to a schema from the document.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// Deduplicated registry of the types of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCatalog {
    types: Vec<TypeRecord>,
    index: HashMap<String, TypeHandle>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    /// Creates a catalog holding the sentinel and the builtin primitives.
    pub fn new() -> Self {
        let mut catalog = Self {
            types: Vec::new(),
            index: HashMap::new(),
        };
        catalog.insert(UNKNOWN_TYPE_ID, TypeKind::Unknown, UNKNOWN_TYPE_ID, true);
        for kind in TypeKind::BUILTINS {
            catalog.insert(kind.as_str(), kind, kind.as_str(), true);
        }
        catalog
    }

    /// Pass 1: declares every named schema with its (unresolved) properties.
    ///
    /// A schema whose identifier is already declared keeps the first declaration.
    pub fn declare_schemas(&mut self, schemas: &[SchemaDecl]) {
        for schema in schemas {
            if self.contains(&schema.id) {
                debug!(id = %schema.id, "Schema declared twice, keeping the first declaration");
                continue;
            }

            let kind = schema
                .primitive
                .as_deref()
                .and_then(TypeKind::from_type_name)
                .unwrap_or(TypeKind::Object);
            let handle = self.declare(&schema.id, kind, &schema.name);
            for prop in &schema.properties {
                self.add_property(handle, &prop.name, prop.schema.clone());
            }
        }
    }

    /// Creates the type `id`, or returns the existing handle unchanged.
    pub fn declare(&mut self, id: &str, kind: TypeKind, name: &str) -> TypeHandle {
        match self.index.get(id) {
            Some(handle) => *handle,
            None => self.insert(id, kind, name, false),
        }
    }

    /// Looks up `id`; absent, empty and unknown identifiers all yield the sentinel.
    pub fn find<'a>(&self, id: impl Into<Option<&'a str>>) -> TypeHandle {
        match id.into() {
            Some(id) if !id.is_empty() => self
                .index
                .get(id)
                .copied()
                .unwrap_or(TypeHandle::UNKNOWN),
            _ => TypeHandle::UNKNOWN,
        }
    }

    /// Looks up a builtin by its OpenAPI type name, case-insensitively.
    pub fn find_primitive(&self, name: &str) -> TypeHandle {
        self.find(name.to_ascii_lowercase().as_str())
    }

    /// Resolves a type position: reference first, then primitive name, else the sentinel.
    pub fn resolve_schema(&self, schema: &SchemaRef) -> TypeHandle {
        match (&schema.reference, &schema.primitive) {
            (Some(reference), _) => self.find(reference.as_str()),
            (None, Some(primitive)) => self.find_primitive(primitive),
            (None, None) => TypeHandle::UNKNOWN,
        }
    }

    /// The sentinel handle.
    pub fn unknown(&self) -> TypeHandle {
        TypeHandle::UNKNOWN
    }

    /// Whether `id` is declared.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The record behind `handle`; foreign or stale handles yield the sentinel record.
    pub fn get(&self, handle: TypeHandle) -> &TypeRecord {
        match self.types.get(handle.0) {
            Some(record) => record,
            None => &self.types[TypeHandle::UNKNOWN.0],
        }
    }

    /// Number of types, builtins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: the sentinel is always present.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All types in declaration order, builtins first.
    pub fn iter(&self) -> impl Iterator<Item = (TypeHandle, &TypeRecord)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, record)| (TypeHandle(i), record))
    }

    /// Types declared from the document, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = (TypeHandle, &TypeRecord)> {
        self.iter().filter(|(_, record)| !record.builtin)
    }

    pub(crate) fn property_count(&self, handle: TypeHandle) -> usize {
        self.types
            .get(handle.0)
            .map_or(0, |record| record.properties.len())
    }

    pub(crate) fn property(&self, handle: TypeHandle, idx: usize) -> Option<&Property> {
        self.types
            .get(handle.0)
            .and_then(|record| record.properties.get(idx))
    }

    pub(crate) fn set_property_type(&mut self, handle: TypeHandle, idx: usize, ty: TypeHandle) {
        if let Some(prop) = self
            .types
            .get_mut(handle.0)
            .and_then(|record| record.properties.get_mut(idx))
        {
            prop.ty = Some(ty);
        }
    }

    fn add_property(&mut self, handle: TypeHandle, name: &str, schema: SchemaRef) {
        if let Some(record) = self.types.get_mut(handle.0) {
            record.properties.push(Property {
                name: name.to_string(),
                schema,
                ty: None,
            });
        }
    }

    fn insert(&mut self, id: &str, kind: TypeKind, name: &str, builtin: bool) -> TypeHandle {
        let handle = TypeHandle(self.types.len());
        self.types.push(TypeRecord {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            builtin,
            properties: Vec::new(),
        });
        self.index.insert(id.to_string(), handle);
        handle
    }
}

#![deny(missing_docs)]

//! # Description Models
//!
//! The normalized view of one API description handed to the model builder.
//!
//! Both remote documents (OpenAPI 3.x / Swagger 2.0) and in-process `utoipa` documents are
//! adapted into these structs before any type or action is built, so the rest of the
//! pipeline never looks at raw YAML.

use indexmap::IndexMap;

/// How a schema position points at its type: a named reference, a primitive name, or both.
///
/// `reference` already holds a catalog identifier (e.g. `#/components/schemas/User`), not
/// the raw `$ref` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRef {
    /// Identifier of a named schema.
    pub reference: Option<String>,
    /// Declared primitive type name (`string`, `integer`, `object`, ...).
    pub primitive: Option<String>,
}

impl SchemaRef {
    /// A position pointing at a named schema.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            reference: Some(id.into()),
            primitive: None,
        }
    }

    /// A position declaring only a primitive type.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            reference: None,
            primitive: Some(name.into()),
        }
    }

    /// True when neither a reference nor a primitive was declared.
    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.primitive.is_none()
    }
}

/// A named schema from `components/schemas` (or Swagger 2.0 `definitions`).
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDecl {
    /// Catalog identifier.
    pub id: String,
    /// Declared schema name.
    pub name: String,
    /// Declared primitive type of the schema itself, if any.
    pub primitive: Option<String>,
    /// Properties in declaration order.
    pub properties: Vec<PropertyDecl>,
}

/// One property of a named schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    /// Property name.
    pub name: String,
    /// Unresolved type position.
    pub schema: SchemaRef,
}

/// One declared operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    /// Parameter name.
    pub name: String,
    /// Raw `in` value, as written in the document.
    pub location: Option<String>,
    /// Type position.
    pub schema: SchemaRef,
}

/// One operation (route x verb).
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDecl {
    /// Route template, e.g. `/widgets/{id}`.
    pub route: String,
    /// Upper-case HTTP verb.
    pub verb: String,
    /// `operationId`, when declared.
    pub operation_id: Option<String>,
    /// Declared tag names in order.
    pub tags: Vec<String>,
    /// Parameters in declaration order (operation level first, then path level).
    pub parameters: Vec<ParameterDecl>,
    /// Schema of the first request body content entry.
    pub request_body: Option<SchemaRef>,
    /// Responses keyed by status code; the value is the first content entry's schema.
    pub responses: IndexMap<String, Option<SchemaRef>>,
}

impl OperationDecl {
    /// Schema of the response declared for `status`, if it has one.
    pub fn response_schema(&self, status: &str) -> Option<&SchemaRef> {
        self.responses.get(status).and_then(Option::as_ref)
    }
}

/// The full normalized view of one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiDescription {
    /// Declared server URLs (may be relative).
    pub servers: Vec<String>,
    /// Named schemas in document order.
    pub schemas: Vec<SchemaDecl>,
    /// Operations in document order.
    pub operations: Vec<OperationDecl>,
}

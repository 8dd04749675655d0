#![deny(missing_docs)]

//! # Document Shims
//!
//! Lenient structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to OpenAPI 3.x / Swagger 2.0 objects, keep only the fields
//! the model builder reads, and ignore everything else.
//!
//! Maps use `IndexMap` so document order survives into the model.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Verbs of a Path Item, in the order operations are emitted.
pub const PATH_ITEM_VERBS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.1.0").
    #[serde(default, deserialize_with = "version_string")]
    pub openapi: Option<String>,

    /// Swagger version (e.g. "2.0") for legacy support.
    #[serde(default, deserialize_with = "version_string")]
    pub swagger: Option<String>,

    /// Server configuration (OAS 3.x).
    #[serde(default, deserialize_with = "lenient_vec")]
    pub servers: Vec<ShimServer>,

    /// Host (Swagger 2.0 Legacy).
    pub host: Option<String>,

    /// Base path (Swagger 2.0 Legacy).
    #[serde(rename = "basePath")]
    pub base_path: Option<String>,

    /// Transfer schemes (Swagger 2.0 Legacy).
    #[serde(default)]
    pub schemes: Vec<String>,

    /// Path items.
    #[serde(default)]
    pub paths: ShimPaths,

    /// Components section (OAS 3.x).
    pub components: Option<ShimComponents>,

    /// Schema definitions (Swagger 2.0 Legacy).
    #[serde(default, deserialize_with = "lenient_map")]
    pub definitions: IndexMap<String, ShimSchemaOrAny>,

    /// Reusable parameters (Swagger 2.0 Legacy).
    #[serde(default, deserialize_with = "lenient_map")]
    pub parameters: IndexMap<String, ShimParameter>,

    /// Reusable responses (Swagger 2.0 Legacy).
    #[serde(default, deserialize_with = "lenient_map")]
    pub responses: IndexMap<String, ShimResponse>,
}

/// Server object.
#[derive(Debug, Clone, Deserialize)]
pub struct ShimServer {
    /// Server URL, possibly relative.
    pub url: String,
}

/// Components object (OAS 3.x) holding reusable definitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimComponents {
    /// Named schemas.
    #[serde(default, deserialize_with = "lenient_map")]
    pub schemas: IndexMap<String, ShimSchemaOrAny>,
    /// Reusable parameters.
    #[serde(default, deserialize_with = "lenient_map")]
    pub parameters: IndexMap<String, ShimParameter>,
    /// Reusable responses.
    #[serde(default, deserialize_with = "lenient_map")]
    pub responses: IndexMap<String, ShimResponse>,
    /// Reusable request bodies.
    #[serde(rename = "requestBodies", default, deserialize_with = "lenient_map")]
    pub request_bodies: IndexMap<String, ShimRequestBody>,
}

/// The `type` keyword: a single name, or a list in OAS 3.1 (`[string, "null"]`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ShimSchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl ShimSchemaType {
    /// The first non-null type name.
    pub fn primary(&self) -> Option<&str> {
        match self {
            ShimSchemaType::Single(t) => Some(t.as_str()),
            ShimSchemaType::Multiple(types) => types
                .iter()
                .map(String::as_str)
                .find(|t| !t.eq_ignore_ascii_case("null")),
        }
    }
}

/// Schema object, reduced to what type resolution needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimSchema {
    /// `$ref` target.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Declared type.
    #[serde(rename = "type")]
    pub schema_type: Option<ShimSchemaType>,
    /// Object properties in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, ShimSchemaOrAny>,
}

impl ShimSchema {
    /// The declared primitive type name, if any.
    pub fn primary_type(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(ShimSchemaType::primary)
    }
}

/// A schema position that tolerates boolean schemas and malformed objects.
///
/// Anything that is not a readable Schema Object is kept as raw JSON and resolves to
/// the unknown type later, instead of failing the whole document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShimSchemaOrAny {
    /// A readable Schema Object.
    Schema(ShimSchema),
    /// Boolean schema or unreadable value.
    Other(Value),
}

impl ShimSchemaOrAny {
    /// The Schema Object, when readable.
    pub fn schema(&self) -> Option<&ShimSchema> {
        match self {
            ShimSchemaOrAny::Schema(s) => Some(s),
            ShimSchemaOrAny::Other(_) => None,
        }
    }
}

/// Parameter object or Reference object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimParameter {
    /// `$ref` to a reusable parameter.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Name of the parameter.
    pub name: Option<String>,
    /// Location (query, path, header, cookie, body, formData).
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// Schema definition (OAS 3.x, and Swagger 2.0 `in: body`).
    pub schema: Option<ShimSchemaOrAny>,
    /// Legacy Swagger 2.0 primitive type.
    #[serde(rename = "type")]
    pub schema_type: Option<ShimSchemaType>,
}

impl ShimParameter {
    /// True for Swagger 2.0 body parameters.
    pub fn is_body(&self) -> bool {
        self.location
            .as_deref()
            .is_some_and(|l| l.eq_ignore_ascii_case("body"))
    }
}

/// Media type object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimMediaType {
    /// Payload schema.
    pub schema: Option<ShimSchemaOrAny>,
}

/// Request body object or Reference object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimRequestBody {
    /// `$ref` to a reusable request body.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Content keyed by media type, in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// Response object or Reference object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimResponse {
    /// `$ref` to a reusable response.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Content keyed by media type (OAS 3.x).
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Response schema (Swagger 2.0 Legacy).
    pub schema: Option<ShimSchemaOrAny>,
}

/// Operation object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimOperation {
    /// Unique operation id.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation level parameters.
    #[serde(default)]
    pub parameters: Vec<ShimParameter>,
    /// Request body (OAS 3.x).
    #[serde(rename = "requestBody")]
    pub request_body: Option<ShimRequestBody>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: IndexMap<String, ShimResponse>,
}

/// Path item object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShimPathItem {
    /// Parameters shared by every operation of the path.
    #[serde(default)]
    pub parameters: Vec<ShimParameter>,
    /// GET operation.
    pub get: Option<ShimOperation>,
    /// PUT operation.
    pub put: Option<ShimOperation>,
    /// POST operation.
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// Declared operations with their lower-case verb, in `PATH_ITEM_VERBS` order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &ShimOperation)> {
        let ops = [
            &self.get,
            &self.put,
            &self.post,
            &self.delete,
            &self.options,
            &self.head,
            &self.patch,
            &self.trace,
        ];
        PATH_ITEM_VERBS
            .into_iter()
            .zip(ops)
            .filter_map(|(verb, op)| op.as_ref().map(|o| (verb, o)))
    }
}

/// Represents the Paths Object.
///
/// Specification extensions (`x-...`) are dropped, and path items that cannot be read are
/// skipped with a warning so one broken route does not discard the whole document.
/// `paths: null` reads as no paths.
#[derive(Debug, Clone, Default)]
pub struct ShimPaths {
    /// Parsed path items keyed by path template, in document order.
    pub items: IndexMap<String, ShimPathItem>,
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw =
            Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        let mut items = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                continue;
            }
            match serde_json::from_value::<ShimPathItem>(value) {
                Ok(item) => {
                    items.insert(key, item);
                }
                Err(e) => warn!(path = %key, "Skipping unreadable path item: {}", e),
            }
        }

        Ok(Self { items })
    }
}

/// Reads a list entry by entry, skipping unreadable entries with a warning.
///
/// `null` or a non-list value reads as empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(raw)) => raw,
        Some(other) => {
            warn!("Ignoring {} where a list was expected", other);
            return Ok(Vec::new());
        }
    };

    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index, "Skipping unreadable entry: {}", e);
                None
            }
        })
        .collect())
}

/// Reads a map entry by entry in document order, skipping unreadable entries with a warning.
///
/// `null` or a non-map value reads as empty.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(IndexMap::new()),
        Some(Value::Object(raw)) => raw,
        Some(other) => {
            warn!("Ignoring {} where a map was expected", other);
            return Ok(IndexMap::new());
        }
    };

    let mut items = IndexMap::new();
    for (key, value) in raw {
        match serde_json::from_value::<T>(value) {
            Ok(item) => {
                items.insert(key, item);
            }
            Err(e) => warn!(key = %key, "Skipping unreadable entry: {}", e),
        }
    }
    Ok(items)
}

/// Accepts `openapi: 3.0.0` as well as unquoted YAML numbers like `swagger: 2.0`.
fn version_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(DeError::custom(format!(
            "version must be a string, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_type_variants() {
        let single: ShimSchema = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(single.primary_type(), Some("string"));

        let multi: ShimSchema =
            serde_json::from_value(json!({"type": ["null", "integer"]})).unwrap();
        assert_eq!(multi.primary_type(), Some("integer"));

        let none: ShimSchema = serde_json::from_value(json!({})).unwrap();
        assert_eq!(none.primary_type(), None);
    }

    #[test]
    fn test_boolean_schema_is_tolerated() {
        let schema: ShimSchema = serde_json::from_value(json!({
            "type": "object",
            "properties": { "anything": true, "name": {"type": "string"} }
        }))
        .unwrap();

        assert!(schema.properties["anything"].schema().is_none());
        assert_eq!(
            schema.properties["name"].schema().and_then(|s| s.primary_type()),
            Some("string")
        );
    }

    #[test]
    fn test_paths_skip_extensions_and_keep_order() {
        let paths: ShimPaths = serde_json::from_value(json!({
            "/b": {"get": {}},
            "x-internal": {"anything": 1},
            "/a": {"post": {}}
        }))
        .unwrap();

        let keys: Vec<_> = paths.items.keys().cloned().collect();
        assert_eq!(keys, vec!["/b", "/a"]);
    }

    #[test]
    fn test_paths_skip_unreadable_item() {
        let paths: ShimPaths = serde_json::from_value(json!({
            "/broken": {"get": "not an operation"},
            "/ok": {"get": {}}
        }))
        .unwrap();

        assert_eq!(paths.items.len(), 1);
        assert!(paths.items.contains_key("/ok"));
    }

    #[test]
    fn test_null_paths_read_as_empty() {
        let doc: ShimOpenApi =
            serde_json::from_value(json!({"openapi": "3.0.0", "paths": null})).unwrap();
        assert!(doc.paths.items.is_empty());
    }

    #[test]
    fn test_server_without_url_is_skipped() {
        let doc: ShimOpenApi = serde_json::from_value(json!({
            "servers": [{"description": "no url"}, {"url": "https://api.example.com"}],
            "paths": {"/ok": {"get": {}}}
        }))
        .unwrap();

        let urls: Vec<_> = doc.servers.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://api.example.com"]);
        assert!(doc.paths.items.contains_key("/ok"));
    }

    #[test]
    fn test_unreadable_components_are_skipped() {
        let doc: ShimOpenApi = serde_json::from_value(json!({
            "components": {
                "parameters": {
                    "Broken": {"name": ["not", "a", "string"]},
                    "Limit": {"name": "limit", "in": "query"}
                },
                "responses": {"Bad": {"content": "nope"}, "Ok": {}},
                "requestBodies": {"Bad": 42, "Pet": {"content": {}}}
            },
            "parameters": {"Broken": "nope", "Page": {"name": "page", "in": "query"}},
            "responses": null
        }))
        .unwrap();

        let components = doc.components.unwrap();
        assert_eq!(components.parameters.keys().collect::<Vec<_>>(), vec!["Limit"]);
        assert_eq!(components.responses.keys().collect::<Vec<_>>(), vec!["Ok"]);
        assert_eq!(components.request_bodies.keys().collect::<Vec<_>>(), vec!["Pet"]);
        assert_eq!(doc.parameters.keys().collect::<Vec<_>>(), vec!["Page"]);
        assert!(doc.responses.is_empty());
    }

    #[test]
    fn test_path_item_operation_order() {
        let item: ShimPathItem = serde_json::from_value(json!({
            "post": {}, "get": {}, "delete": {}
        }))
        .unwrap();

        let verbs: Vec<_> = item.operations().map(|(v, _)| v).collect();
        assert_eq!(verbs, vec!["get", "post", "delete"]);
    }

    #[test]
    fn test_numeric_version_accepted() {
        let doc: ShimOpenApi = serde_json::from_value(json!({"swagger": 2.0})).unwrap();
        assert!(doc.swagger.unwrap().starts_with('2'));
    }
}

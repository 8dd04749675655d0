#![deny(missing_docs)]

//! # Document Adapter
//!
//! Turns an OpenAPI 3.x or Swagger 2.0 document (JSON or YAML text, a JSON value, or an
//! in-process `utoipa` document) into the normalized [`ApiDescription`].
//!
//! This layer only reads what the model needs. It rejects documents without a supported
//! version field; everything else that is missing or unreadable degrades to empty values.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    ApiDescription, OperationDecl, ParameterDecl, PropertyDecl, SchemaDecl, SchemaRef,
};
use crate::oas::ref_utils::{extract_component_name, schema_id, schema_id_from_ref};
use crate::oas::shims::{
    ShimComponents, ShimMediaType, ShimOpenApi, ShimOperation, ShimParameter, ShimRequestBody,
    ShimResponse, ShimSchema, ShimSchemaOrAny,
};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Parses raw description text (JSON or YAML).
pub fn parse_api_description(text: &str) -> AppResult<ApiDescription> {
    let raw = parse_document_value(text)?;
    description_from_value(raw)
}

/// Adapts an already-parsed JSON value.
pub fn description_from_value(raw: JsonValue) -> AppResult<ApiDescription> {
    let doc: ShimOpenApi = serde_json::from_value(raw)
        .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI document: {}", e)))?;
    validate_version(&doc)?;
    Ok(DocumentAdapter::new(&doc).describe())
}

/// Adapts an in-process `utoipa` document, e.g. the one derived for a local Rust service.
pub fn from_utoipa(openapi: &utoipa::openapi::OpenApi) -> AppResult<ApiDescription> {
    let raw = serde_json::to_value(openapi)
        .map_err(|e| AppError::Parse(format!("Failed to serialize utoipa document: {}", e)))?;
    description_from_value(raw)
}

/// Reads JSON or YAML into a JSON value.
///
/// YAML mapping keys are stringified, so unquoted status codes (`200:`) become `"200"`.
fn parse_document_value(text: &str) -> AppResult<JsonValue> {
    if text.trim_start().starts_with('{') {
        return serde_json::from_str(text)
            .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI JSON: {}", e)));
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::Parse(format!("Failed to parse OpenAPI YAML: {}", e)))?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(value: serde_yaml::Value) -> JsonValue {
    match value {
        serde_yaml::Value::Null => JsonValue::Null,
        serde_yaml::Value::Bool(b) => JsonValue::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            }
        }
        serde_yaml::Value::String(s) => JsonValue::String(s),
        serde_yaml::Value::Sequence(seq) => {
            JsonValue::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                obj.insert(yaml_key(k), yaml_to_json(v));
            }
            JsonValue::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn validate_version(doc: &ShimOpenApi) -> AppResult<()> {
    if let Some(version) = &doc.openapi {
        if !version.starts_with("3.") {
            return Err(AppError::Parse(format!(
                "Unsupported OpenAPI version: {}. Only 3.x is supported.",
                version
            )));
        }
    } else if let Some(version) = &doc.swagger {
        if !version.starts_with('2') {
            return Err(AppError::Parse(format!(
                "Unsupported Swagger version: {}. Only 2.0 is supported for legacy compatibility.",
                version
            )));
        }
    } else {
        return Err(AppError::Parse(
            "Invalid OpenAPI document: missing 'openapi' or 'swagger' version field.".into(),
        ));
    }
    Ok(())
}

/// Walks one shim document with its reusable components at hand.
struct DocumentAdapter<'a> {
    doc: &'a ShimOpenApi,
    components: Option<&'a ShimComponents>,
}

impl<'a> DocumentAdapter<'a> {
    fn new(doc: &'a ShimOpenApi) -> Self {
        Self {
            doc,
            components: doc.components.as_ref(),
        }
    }

    fn describe(&self) -> ApiDescription {
        ApiDescription {
            servers: self.servers(),
            schemas: self.schemas(),
            operations: self.operations(),
        }
    }

    fn servers(&self) -> Vec<String> {
        let mut servers: Vec<String> = self.doc.servers.iter().map(|s| s.url.clone()).collect();

        // Swagger 2.0: host + basePath + schemes
        let base_path = self.doc.base_path.clone().unwrap_or_default();
        match &self.doc.host {
            Some(host) => {
                let schemes = if self.doc.schemes.is_empty() {
                    vec!["https".to_string()]
                } else {
                    self.doc.schemes.clone()
                };
                for scheme in schemes {
                    servers.push(format!("{}://{}{}", scheme, host, base_path));
                }
            }
            None if !base_path.is_empty() => servers.push(base_path),
            None => {}
        }
        servers
    }

    fn schemas(&self) -> Vec<SchemaDecl> {
        let oas3 = self.components.into_iter().flat_map(|c| c.schemas.iter());
        oas3.chain(self.doc.definitions.iter())
            .map(|(name, schema)| schema_decl(name, schema))
            .collect()
    }

    fn operations(&self) -> Vec<OperationDecl> {
        let doc = self.doc;
        let mut operations = Vec::new();
        for (route, item) in &doc.paths.items {
            for (verb, op) in item.operations() {
                operations.push(self.operation(route, verb, op, &item.parameters));
            }
        }
        operations
    }

    fn operation(
        &self,
        route: &str,
        verb: &str,
        op: &'a ShimOperation,
        common: &'a [ShimParameter],
    ) -> OperationDecl {
        let mut parameters = Vec::new();
        let mut seen = HashSet::new();
        let mut legacy_body = None;

        // Operation parameters first, then path-level ones that were not overridden.
        let own = op.parameters.iter().map(|p| (p, true));
        let shared = common.iter().map(|p| (p, false));
        for (param, is_own) in own.chain(shared) {
            let Some(param) = self.resolve_parameter(param) else {
                continue;
            };
            let Some(name) = param.name.clone() else {
                debug!(route, verb, "Skipping parameter without a name");
                continue;
            };

            let key = (
                name.clone(),
                param.location.as_deref().unwrap_or_default().to_lowercase(),
            );
            if !is_own && seen.contains(&key) {
                continue;
            }
            seen.insert(key);

            if param.is_body() {
                if legacy_body.is_none() {
                    legacy_body = Some(optional_schema_ref(param.schema.as_ref()));
                }
                continue;
            }

            let schema = match &param.schema {
                Some(s) => schema_ref_of(s),
                None => SchemaRef {
                    reference: None,
                    primitive: param
                        .schema_type
                        .as_ref()
                        .and_then(|t| t.primary())
                        .map(str::to_string),
                },
            };

            parameters.push(ParameterDecl {
                name,
                location: param.location.clone(),
                schema,
            });
        }

        let request_body = op
            .request_body
            .as_ref()
            .and_then(|b| self.resolve_request_body(b))
            .and_then(|b| first_media_schema(&b.content))
            .or(legacy_body);

        let responses = op
            .responses
            .iter()
            .map(|(status, resp)| (status.clone(), self.response_schema(resp)))
            .collect::<IndexMap<_, _>>();

        OperationDecl {
            route: route.to_string(),
            verb: verb.to_uppercase(),
            operation_id: op.operation_id.clone(),
            tags: op.tags.clone(),
            parameters,
            request_body,
            responses,
        }
    }

    fn resolve_parameter(&self, param: &'a ShimParameter) -> Option<&'a ShimParameter> {
        let Some(reference) = &param.reference else {
            return Some(param);
        };

        let resolved = extract_component_name(reference, "parameters").and_then(|name| {
            self.components
                .and_then(|c| c.parameters.get(&name))
                .or_else(|| self.doc.parameters.get(&name))
        });
        if resolved.is_none() {
            warn!(reference = %reference, "Skipping unresolvable parameter reference");
        }
        resolved
    }

    fn resolve_request_body(&self, body: &'a ShimRequestBody) -> Option<&'a ShimRequestBody> {
        let Some(reference) = &body.reference else {
            return Some(body);
        };

        let resolved = extract_component_name(reference, "requestBodies")
            .and_then(|name| self.components.and_then(|c| c.request_bodies.get(&name)));
        if resolved.is_none() {
            warn!(reference = %reference, "Ignoring unresolvable request body reference");
        }
        resolved
    }

    fn response_schema(&self, resp: &'a ShimResponse) -> Option<SchemaRef> {
        let resp = match &resp.reference {
            None => resp,
            Some(reference) => extract_component_name(reference, "responses").and_then(|name| {
                self.components
                    .and_then(|c| c.responses.get(&name))
                    .or_else(|| self.doc.responses.get(&name))
            })?,
        };

        first_media_schema(&resp.content).or_else(|| resp.schema.as_ref().map(schema_ref_of))
    }
}

fn schema_decl(name: &str, schema: &ShimSchemaOrAny) -> SchemaDecl {
    let (primitive, properties) = match schema.schema() {
        Some(s) => (
            s.primary_type().map(str::to_string),
            s.properties
                .iter()
                .map(|(prop, prop_schema)| PropertyDecl {
                    name: prop.clone(),
                    schema: schema_ref_of(prop_schema),
                })
                .collect(),
        ),
        None => (None, Vec::new()),
    };

    SchemaDecl {
        id: schema_id(name),
        name: name.to_string(),
        primitive,
        properties,
    }
}

/// The schema of the first declared content entry, or an empty position when the entry
/// has no schema. `None` only when there is no content at all.
fn first_media_schema(content: &IndexMap<String, ShimMediaType>) -> Option<SchemaRef> {
    content
        .values()
        .next()
        .map(|media| optional_schema_ref(media.schema.as_ref()))
}

fn optional_schema_ref(schema: Option<&ShimSchemaOrAny>) -> SchemaRef {
    schema.map(schema_ref_of).unwrap_or_default()
}

fn schema_ref_of(schema: &ShimSchemaOrAny) -> SchemaRef {
    schema.schema().map(shim_schema_ref).unwrap_or_default()
}

fn shim_schema_ref(schema: &ShimSchema) -> SchemaRef {
    SchemaRef {
        reference: schema.reference.as_deref().map(schema_id_from_ref),
        primitive: schema.primary_type().map(str::to_string),
    }
}

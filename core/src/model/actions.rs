#![deny(missing_docs)]

//! # Action Extraction
//!
//! Builds one [`Action`] per (route, verb) of a description, typed against the source's
//! already-resolved [`TypeCatalog`].
//!
//! Every handle an action carries comes from that catalog; anything that cannot be typed
//! is bound to the unknown sentinel instead of being left out.

use crate::model::catalog::{TypeCatalog, TypeHandle};
use crate::model::naming::{derive_action_name, derive_controller_name, to_snake_case};
use crate::oas::models::{ApiDescription, OperationDecl, SchemaRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Status code whose response decides the return type.
pub const SUCCESS_STATUS: &str = "200";

/// Placeholder primitive that never counts as a return type on its own.
const GENERIC_OBJECT: &str = "object";

/// The transport location a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// URL Path parameter (e.g. /users/{id})
    Path,
    /// URL Query parameter (e.g. /users?page=1)
    Query,
    /// Request body.
    Body,
    /// Header, cookie, form data, or no location at all.
    None,
}

impl BindingKind {
    /// Classifies a declared `in` value, case-insensitively.
    pub fn from_location(location: Option<&str>) -> Self {
        match location.map(str::to_ascii_lowercase).as_deref() {
            Some("path") => BindingKind::Path,
            Some("query") => BindingKind::Query,
            _ => BindingKind::None,
        }
    }
}

/// A typed, bound parameter of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionParam {
    /// Parameter type.
    pub ty: TypeHandle,
    /// Where the value travels.
    pub binding: BindingKind,
}

/// One operation of a source, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Upper-case HTTP verb.
    pub verb: String,
    /// Route template, e.g. `/widgets/{id}`.
    pub route: String,
    /// Block-safe action name (snake_case `operationId`, else derived from verb and route).
    pub name: String,
    /// Grouping name: first tag, else derived from the route.
    pub controller: String,
    /// Return type; the sentinel when nothing usable is declared.
    pub return_type: TypeHandle,
    /// Parameters in declaration order, body last.
    ///
    /// Path/query parameters are keyed by their declared name, the body by its type's name.
    /// A name repeated in another location is keyed `{name}_{location}`.
    pub params: IndexMap<String, ActionParam>,
}

impl Action {
    /// The body parameter, if the operation declares one.
    pub fn body(&self) -> Option<(&str, &ActionParam)> {
        self.params
            .iter()
            .find(|(_, p)| p.binding == BindingKind::Body)
            .map(|(name, p)| (name.as_str(), p))
    }
}

/// Extracts the actions of `description`, in document order.
///
/// `catalog` must be the fully resolved catalog built from the same description.
pub fn extract_actions(description: &ApiDescription, catalog: &TypeCatalog) -> Vec<Action> {
    description
        .operations
        .iter()
        .map(|op| extract_action(op, catalog))
        .collect()
}

/// Builds the action of a single operation.
pub fn extract_action(op: &OperationDecl, catalog: &TypeCatalog) -> Action {
    let mut params = IndexMap::new();
    for param in &op.parameters {
        let key = if params.contains_key(&param.name) {
            let key = qualified_key(&params, &param.name, param.location.as_deref());
            warn!(
                verb = %op.verb,
                route = %op.route,
                name = %param.name,
                key = %key,
                "Parameter name already used by another location; keyed by name and location"
            );
            key
        } else {
            param.name.clone()
        };
        params.insert(
            key,
            ActionParam {
                ty: catalog.resolve_schema(&param.schema),
                binding: BindingKind::from_location(param.location.as_deref()),
            },
        );
    }

    if let Some(body) = &op.request_body {
        let ty = catalog.resolve_schema(body);
        let key = catalog.get(ty).name().to_string();
        if params.shift_remove(&key).is_some() {
            warn!(
                verb = %op.verb,
                route = %op.route,
                key = %key,
                "Body parameter name collides with a declared parameter; the body replaces it"
            );
        }
        params.insert(
            key,
            ActionParam {
                ty,
                binding: BindingKind::Body,
            },
        );
    }

    Action {
        verb: op.verb.clone(),
        route: op.route.clone(),
        name: op
            .operation_id
            .as_deref()
            .map(to_snake_case)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| derive_action_name(&op.verb, &op.route)),
        controller: op
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| derive_controller_name(&op.route)),
        return_type: select_return_type(op.response_schema(SUCCESS_STATUS), catalog),
        params,
    }
}

/// `{name}_{location}` for a repeated parameter name, numbered if even that is taken.
fn qualified_key(
    params: &IndexMap<String, ActionParam>,
    name: &str,
    location: Option<&str>,
) -> String {
    let location = location
        .map(str::to_ascii_lowercase)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "none".to_string());
    let base = format!("{}_{}", name, location);
    let mut key = base.clone();
    let mut n = 2;
    while params.contains_key(&key) {
        key = format!("{}_{}", base, n);
        n += 1;
    }
    key
}

/// Picks the return type of a `200` response schema.
///
/// Priority: declared primitive (unless it is the generic `object`), then the reference,
/// then the sentinel.
pub fn select_return_type(schema: Option<&SchemaRef>, catalog: &TypeCatalog) -> TypeHandle {
    let Some(schema) = schema else {
        return TypeHandle::UNKNOWN;
    };

    let by_primitive = schema
        .primitive
        .as_deref()
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(GENERIC_OBJECT))
        .map(|p| catalog.find_primitive(p));
    let by_reference = schema.reference.as_deref().map(|r| catalog.find(r));

    [by_primitive, by_reference]
        .into_iter()
        .flatten()
        .find(|handle| !handle.is_unknown())
        .unwrap_or(TypeHandle::UNKNOWN)
}

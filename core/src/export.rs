#![deny(missing_docs)]

//! # Model Export
//!
//! Serializable projection of the aggregate, consumed by renderers over JSON.
//! Handles are replaced by type identifiers so a document stands on its own.

use crate::aggregate::{ModelAggregator, SourceView};
use crate::error::{AppError, AppResult};
use crate::model::{Action, BindingKind, TypeKind, TypeRecord};
use crate::registry::SourceFailure;
use serde::{Deserialize, Serialize};

/// The whole exported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelDocument {
    /// Registered sources in registration order.
    pub sources: Vec<SourceDocument>,
    /// Sources left out of the model.
    #[serde(default)]
    pub failures: Vec<SourceFailure>,
}

/// One source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Source key.
    pub key: String,
    /// Base URL, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// Actions in document order.
    pub actions: Vec<ActionDocument>,
    /// Referenced types in catalog order.
    pub types: Vec<TypeDocument>,
}

/// One action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDocument {
    /// Block-safe name.
    pub name: String,
    /// HTTP verb.
    pub verb: String,
    /// Route template.
    pub route: String,
    /// Grouping name.
    pub controller: String,
    /// Identifier of the return type.
    pub return_type: String,
    /// Parameters, body last.
    pub params: Vec<ParamDocument>,
}

/// One parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDocument {
    /// Parameter key (type name for the body).
    pub name: String,
    /// Identifier of the parameter type.
    #[serde(rename = "type")]
    pub type_id: String,
    /// Transport binding.
    pub binding: BindingKind,
}

/// One type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDocument {
    /// Stable identifier.
    pub id: String,
    /// Declared name.
    pub name: String,
    /// Kind.
    pub kind: TypeKind,
    /// Builtin primitive or sentinel.
    pub builtin: bool,
    /// Properties in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDocument>,
}

/// One property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDocument {
    /// Property name.
    pub name: String,
    /// Identifier of the property type.
    #[serde(rename = "type")]
    pub type_id: String,
}

impl ModelDocument {
    /// Exports every source of the aggregate.
    pub fn from_aggregator(aggregator: &ModelAggregator) -> Self {
        Self {
            sources: aggregator.sources().map(SourceDocument::from_view).collect(),
            failures: aggregator.failures().to_vec(),
        }
    }

    /// Exports a single source.
    pub fn for_key(aggregator: &ModelAggregator, key: &str) -> Option<SourceDocument> {
        aggregator.source(key).map(SourceDocument::from_view)
    }

    /// Pretty JSON rendering.
    pub fn to_json_pretty(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::General(format!("Failed to serialize model: {}", e)))
    }
}

impl SourceDocument {
    /// Exports one source view.
    pub fn from_view(view: SourceView<'_>) -> Self {
        Self {
            key: view.key().to_string(),
            site: view.site().map(str::to_string),
            actions: view
                .actions()
                .iter()
                .map(|action| ActionDocument::from_action(action, view))
                .collect(),
            types: view
                .referenced_types()
                .into_iter()
                .map(|(_, record)| TypeDocument::from_record(record, view))
                .collect(),
        }
    }
}

impl ActionDocument {
    fn from_action(action: &Action, view: SourceView<'_>) -> Self {
        Self {
            name: action.name.clone(),
            verb: action.verb.clone(),
            route: action.route.clone(),
            controller: action.controller.clone(),
            return_type: view.type_of(action.return_type).id().to_string(),
            params: action
                .params
                .iter()
                .map(|(name, param)| ParamDocument {
                    name: name.clone(),
                    type_id: view.type_of(param.ty).id().to_string(),
                    binding: param.binding,
                })
                .collect(),
        }
    }
}

impl TypeDocument {
    fn from_record(record: &TypeRecord, view: SourceView<'_>) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.name().to_string(),
            kind: record.kind(),
            builtin: record.is_builtin(),
            properties: record
                .properties()
                .iter()
                .map(|p| PropertyDocument {
                    name: p.name().to_string(),
                    type_id: view.type_of(p.ty()).id().to_string(),
                })
                .collect(),
        }
    }
}
